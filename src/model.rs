//! Data models for shelf planning.
//!
//! This module defines the structures the allocator operates on:
//! - `BoardGame`: an immutable rectangle (name, width, height)
//! - `Stack`: games piled on one footprint, bottom to top
//! - `Shelf`: stacks standing side by side, left to right
//! - `ShelfBlueprint`: template that builds the fixed shelf set
//!
//! Capacities only ever shrink. Placement operations check their own
//! preconditions and return a `PlacementError` instead of driving a
//! remaining capacity negative.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{Dimensional, Vec2, validation::validate_dimension};

/// Validation error for games and shelf capacities.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
}

/// A placement was attempted without its precondition holding.
///
/// The allocator checks `can_fit` / `can_start_new_stack` before placing, so
/// seeing one of these means a caller skipped the check.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error(
        "game '{name}' (W:{width}, H:{height}) does not fit stack (base width {base_width}, remaining height {remaining_height})"
    )]
    GameDoesNotFit {
        name: String,
        width: f64,
        height: f64,
        base_width: f64,
        remaining_height: f64,
    },
    #[error(
        "game '{name}' (W:{width}, H:{height}) cannot start a stack on shelf (remaining length {remaining_length}, max height {max_height})"
    )]
    CannotStartStack {
        name: String,
        width: f64,
        height: f64,
        remaining_length: f64,
        max_height: f64,
    },
    #[error("stack {index} does not exist (shelf has {stacks} stacks)")]
    UnknownStack { index: usize, stacks: usize },
}

fn checked(value: f64, name: &str) -> Result<f64, ValidationError> {
    validate_dimension(value, name).map_err(ValidationError::InvalidDimension)?;
    Ok(value)
}

/// A board game box as seen from the front of the shelf.
///
/// Names are labels only and need not be unique.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({ "name": "Wingspan", "width": 11.6, "height": 2.8 }))]
pub struct BoardGame {
    name: String,
    width: f64,
    height: f64,
}

impl BoardGame {
    /// Creates a new game with validation.
    ///
    /// # Returns
    /// `Ok(BoardGame)` for positive finite dimensions, otherwise `Err(ValidationError)`
    ///
    /// # Examples
    /// ```
    /// use shelf_planner::model::BoardGame;
    ///
    /// assert!(BoardGame::new("Azul", 10.25, 3.0).is_ok());
    /// assert!(BoardGame::new("Broken", -1.0, 3.0).is_err());
    /// ```
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Result<Self, ValidationError> {
        let name = name.into();
        let width = checked(width, &format!("Width of '{}'", name))?;
        let height = checked(height, &format!("Height of '{}'", name))?;
        Ok(Self {
            name,
            width,
            height,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

impl Dimensional for BoardGame {
    fn dimensions(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl std::fmt::Display for BoardGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (W:{}, H:{})", self.name, self.width, self.height)
    }
}

/// Vertical pile of games sharing one footprint.
///
/// `base_width` is fixed by the first game. Games are stored bottom to top.
#[derive(Clone, Debug, PartialEq)]
pub struct Stack {
    base_width: f64,
    max_height: f64,
    remaining_height: f64,
    games: Vec<BoardGame>,
}

impl Stack {
    /// Opens an empty stack with the given footprint and height budget.
    fn empty(base_width: f64, max_height: f64) -> Self {
        Self {
            base_width,
            max_height,
            remaining_height: max_height,
            games: Vec::new(),
        }
    }

    /// Checks whether the game can go on top of this stack.
    pub fn can_fit(&self, game: &BoardGame) -> bool {
        game.width <= self.base_width && game.height <= self.remaining_height
    }

    /// Puts a game on top of the stack.
    ///
    /// # Errors
    /// `PlacementError::GameDoesNotFit` if `can_fit` does not hold; the stack is left untouched.
    pub fn add_game(&mut self, game: BoardGame) -> Result<(), PlacementError> {
        if !self.can_fit(&game) {
            return Err(PlacementError::GameDoesNotFit {
                name: game.name,
                width: game.width,
                height: game.height,
                base_width: self.base_width,
                remaining_height: self.remaining_height,
            });
        }
        self.push(game);
        Ok(())
    }

    fn push(&mut self, game: BoardGame) {
        self.remaining_height -= game.height;
        self.games.push(game);
    }

    pub fn base_width(&self) -> f64 {
        self.base_width
    }

    pub fn remaining_height(&self) -> f64 {
        self.remaining_height
    }

    /// Height consumed by the games in this stack.
    pub fn used_height(&self) -> f64 {
        self.max_height - self.remaining_height
    }

    /// Games from bottom to top.
    pub fn games(&self) -> &[BoardGame] {
        &self.games
    }
}

/// How a shelf treats games taller than the shelf itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HeightRule {
    /// A new stack is only started for games no taller than the shelf.
    #[default]
    Enforce,
    /// Legacy behavior: any game narrow enough starts a stack, even if it
    /// sticks out above the shelf (the stack's remaining height goes negative).
    Permissive,
}

/// A shelf with fixed length and height holding stacks left to right.
#[derive(Clone, Debug, PartialEq)]
pub struct Shelf {
    max_length: f64,
    max_height: f64,
    remaining_length: f64,
    height_rule: HeightRule,
    stacks: Vec<Stack>,
}

impl Shelf {
    /// Creates an empty shelf with validation.
    ///
    /// # Returns
    /// `Ok(Shelf)` for positive finite capacities, otherwise `Err(ValidationError)`
    pub fn new(max_length: f64, max_height: f64) -> Result<Self, ValidationError> {
        checked(max_length, "Shelf length")?;
        checked(max_height, "Shelf height")?;
        Ok(Self {
            max_length,
            max_height,
            remaining_length: max_length,
            height_rule: HeightRule::default(),
            stacks: Vec::new(),
        })
    }

    /// Sets how games taller than the shelf are handled.
    pub fn with_height_rule(mut self, rule: HeightRule) -> Self {
        self.height_rule = rule;
        self
    }

    /// Checks whether a new stack for this game fits on the shelf.
    ///
    /// Width is always checked against the remaining length. Height is only
    /// checked under `HeightRule::Enforce`.
    pub fn can_start_new_stack(&self, game: &BoardGame) -> bool {
        let width_ok = game.width <= self.remaining_length;
        match self.height_rule {
            HeightRule::Enforce => width_ok && game.height <= self.max_height,
            HeightRule::Permissive => width_ok,
        }
    }

    /// Opens a new stack at the right end of the shelf with this game at the bottom.
    ///
    /// # Errors
    /// `PlacementError::CannotStartStack` if `can_start_new_stack` does not hold; the shelf is left untouched.
    pub fn start_new_stack(&mut self, game: BoardGame) -> Result<(), PlacementError> {
        if !self.can_start_new_stack(&game) {
            return Err(PlacementError::CannotStartStack {
                name: game.name,
                width: game.width,
                height: game.height,
                remaining_length: self.remaining_length,
                max_height: self.max_height,
            });
        }

        let footprint = game.width;
        let mut stack = Stack::empty(footprint, self.max_height);
        if stack.can_fit(&game) {
            stack.add_game(game)?;
        } else {
            // Only reachable under HeightRule::Permissive.
            stack.push(game);
        }
        self.remaining_length -= footprint;
        self.stacks.push(stack);
        Ok(())
    }

    /// Index of the leftmost stack that can take the game.
    pub(crate) fn first_fitting_stack(&self, game: &BoardGame) -> Option<usize> {
        self.stacks.iter().position(|stack| stack.can_fit(game))
    }

    /// Puts a game on top of the stack at `index`.
    ///
    /// # Errors
    /// `PlacementError::UnknownStack` for an index past the last stack,
    /// otherwise whatever `Stack::add_game` reports.
    pub fn add_to_stack(&mut self, index: usize, game: BoardGame) -> Result<(), PlacementError> {
        match self.stacks.get_mut(index) {
            Some(stack) => stack.add_game(game),
            None => Err(PlacementError::UnknownStack {
                index,
                stacks: self.stacks.len(),
            }),
        }
    }

    pub fn max_length(&self) -> f64 {
        self.max_length
    }

    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    pub fn remaining_length(&self) -> f64 {
        self.remaining_length
    }

    pub fn height_rule(&self) -> HeightRule {
        self.height_rule
    }

    /// Length taken by stack footprints.
    pub fn used_length(&self) -> f64 {
        self.max_length - self.remaining_length
    }

    /// Stacks from left to right.
    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Number of games over all stacks.
    pub fn game_count(&self) -> usize {
        self.stacks.iter().map(|s| s.games.len()).sum()
    }

    /// Checks whether a game could ever be placed on an empty shelf of this size.
    pub fn could_hold(&self, game: &BoardGame) -> bool {
        match self.height_rule {
            HeightRule::Enforce => game.dimensions().fits_within(&self.dimensions()),
            HeightRule::Permissive => game.width <= self.max_length,
        }
    }
}

impl Dimensional for Shelf {
    fn dimensions(&self) -> Vec2 {
        Vec2::new(self.max_length, self.max_height)
    }
}

/// Template for the fixed set of identical shelves.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({ "count": 14, "length": 13.125, "height": 13.125 }))]
pub struct ShelfBlueprint {
    pub count: usize,
    pub length: f64,
    pub height: f64,
    pub height_rule: HeightRule,
}

impl ShelfBlueprint {
    pub const DEFAULT_COUNT: usize = 14;
    pub const DEFAULT_LENGTH: f64 = 13.125;
    pub const DEFAULT_HEIGHT: f64 = 13.125;
    /// Largest shelf set a blueprint may describe.
    pub const MAX_COUNT: usize = 1_000;

    /// Creates a blueprint after validating the capacities.
    ///
    /// A count of zero is allowed and yields no shelves. Counts above
    /// `MAX_COUNT` are rejected.
    pub fn new(count: usize, length: f64, height: f64) -> Result<Self, ValidationError> {
        Self::checked_count(count)?;
        checked(length, "Shelf length")?;
        checked(height, "Shelf height")?;
        Ok(Self {
            count,
            length,
            height,
            height_rule: HeightRule::default(),
        })
    }

    pub fn with_height_rule(mut self, rule: HeightRule) -> Self {
        self.height_rule = rule;
        self
    }

    fn checked_count(count: usize) -> Result<usize, ValidationError> {
        if count > Self::MAX_COUNT {
            return Err(ValidationError::InvalidDimension(format!(
                "Shelf count must be at most {}, got: {}",
                Self::MAX_COUNT,
                count
            )));
        }
        Ok(count)
    }

    /// Builds `count` empty shelves.
    ///
    /// The fields are public, so the count limit is checked again here.
    pub fn instantiate(&self) -> Result<Vec<Shelf>, ValidationError> {
        (0..Self::checked_count(self.count)?)
            .map(|_| Shelf::new(self.length, self.height).map(|s| s.with_height_rule(self.height_rule)))
            .collect()
    }
}

impl Default for ShelfBlueprint {
    fn default() -> Self {
        Self {
            count: Self::DEFAULT_COUNT,
            length: Self::DEFAULT_LENGTH,
            height: Self::DEFAULT_HEIGHT,
            height_rule: HeightRule::default(),
        }
    }
}
