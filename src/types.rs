//! Common types and traits for 2D shelf geometry.
//!
//! Shelves are planned in a side view: the horizontal axis runs along the
//! shelf length and the vertical axis measures stack height. Everything the
//! planner handles is an axis-aligned rectangle in that plane.

use std::ops::{Add, Mul, Sub};

/// Represents a 2D vector or point in the shelf plane.
///
/// Used for rectangle origins and extents in the layout.
///
/// # Examples
/// ```
/// use shelf_planner::types::Vec2;
///
/// let origin = Vec2::new(1.0, 2.0);
/// let extent = Vec2::new(10.0, 4.0);
/// let center = origin + extent * 0.5;
/// assert_eq!(center, Vec2::new(6.0, 4.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// Creates a new 2D vector.
    ///
    /// # Parameters
    /// * `x` - Horizontal component (along the shelf length)
    /// * `y` - Vertical component (stack height)
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Checks if the vector fits within another vector (component-wise <=).
    #[inline]
    pub fn fits_within(&self, outer: &Self) -> bool {
        self.x <= outer.x && self.y <= outer.y
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

/// Trait for anything with a width and a height.
///
/// Games and shelves expose their side-view extent through it, which is
/// what fit checks and the drawing layout compare.
pub trait Dimensional {
    /// Returns the (width, height) extent.
    fn dimensions(&self) -> Vec2;
}

/// Axis-aligned rectangle in the shelf plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Lower left corner
    pub min: Vec2,
    /// Upper right corner
    pub max: Vec2,
}

impl Rect {
    /// Creates a rectangle from its lower left corner and its extent.
    #[inline]
    pub fn from_origin_and_size(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    /// Checks if two rectangles overlap with positive area.
    ///
    /// Rectangles that only share an edge do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.max.x <= other.min.x
            || other.max.x <= self.min.x
            || self.max.y <= other.min.y
            || other.max.y <= self.min.y)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size() * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Validation helpers shared by games and shelves.
pub mod validation {
    /// Validates a single length.
    ///
    /// # Returns
    /// `Ok(())` for positive finite values, otherwise error text
    pub fn validate_dimension(value: f64, name: &str) -> Result<(), String> {
        if value.is_nan() {
            return Err(format!("{} must not be NaN", name));
        }
        if value.is_infinite() {
            return Err(format!("{} must not be infinite", name));
        }
        if value <= 0.0 {
            return Err(format!("{} must be positive, got: {}", name, value));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);

        assert_eq!(a + b, Vec2::new(5.0, 8.0));
        assert_eq!(b - a, Vec2::new(3.0, 4.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
    }

    #[test]
    fn test_vec2_fits_within_is_inclusive() {
        let shelf = Vec2::new(10.0, 10.0);
        assert!(Vec2::new(10.0, 10.0).fits_within(&shelf));
        assert!(!Vec2::new(10.5, 1.0).fits_within(&shelf));
    }

    #[test]
    fn test_rect_touching_edges_do_not_intersect() {
        let a = Rect::from_origin_and_size(Vec2::default(), Vec2::new(6.0, 4.0));
        let above = Rect::from_origin_and_size(Vec2::new(0.0, 4.0), Vec2::new(6.0, 5.0));
        let overlapping = Rect::from_origin_and_size(Vec2::new(5.0, 3.0), Vec2::new(2.0, 2.0));

        assert!(!a.intersects(&above));
        assert!(a.intersects(&overlapping));
        assert_eq!(a.center(), Vec2::new(3.0, 2.0));
        assert_eq!(above.size(), Vec2::new(6.0, 5.0));
    }

    #[test]
    fn test_validation_dimension() {
        assert!(validation::validate_dimension(13.125, "Width").is_ok());
        assert!(validation::validate_dimension(0.0, "Width").is_err());
        assert!(validation::validate_dimension(-1.0, "Width").is_err());
        assert!(validation::validate_dimension(f64::NAN, "Width").is_err());
        assert!(validation::validate_dimension(f64::INFINITY, "Width").is_err());
    }
}
