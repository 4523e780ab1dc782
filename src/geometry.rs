//! Positions of games in a drawing of the shelf set.
//!
//! Shelves are drawn bottom up, one above the other, each separated by
//! `SHELF_GAP`. Within a shelf, stacks stand left to right with `STACK_GAP`
//! between footprints and games pile up from the shelf floor.

use crate::model::Shelf;
use crate::types::{Dimensional, Rect, Vec2};

/// Vertical space between two drawn shelves.
pub const SHELF_GAP: f64 = 5.0;
/// Horizontal space between two drawn stacks.
pub const STACK_GAP: f64 = 1.0;
/// How far below a shelf floor its baseline is drawn.
pub const BASELINE_DROP: f64 = 1.5;
/// Margin added right of the longest shelf and above the top shelf.
pub const MARGIN: f64 = 5.0;

/// A game at its drawing position.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedGame {
    pub name: String,
    /// 0-based shelf, stack and height position
    pub shelf: usize,
    pub stack: usize,
    pub level: usize,
    pub rect: Rect,
}

/// Horizontal line drawn under a shelf.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub y: f64,
    pub x_start: f64,
    pub x_end: f64,
}

/// Everything the renderer needs, in shelf units with y pointing up.
#[derive(Clone, Debug, PartialEq)]
pub struct ShelfLayout {
    pub games: Vec<PositionedGame>,
    pub baselines: Vec<Baseline>,
    /// Drawing extent including the margins
    pub bounds: Vec2,
}

/// Computes the drawing positions of all placed games.
pub fn layout(shelves: &[Shelf]) -> ShelfLayout {
    let mut games = Vec::new();
    let mut baselines = Vec::with_capacity(shelves.len());
    let mut y_offset = 0.0;

    for (shelf_idx, shelf) in shelves.iter().enumerate() {
        baselines.push(Baseline {
            y: y_offset - BASELINE_DROP,
            x_start: 0.0,
            x_end: shelf.max_length(),
        });

        let mut x_offset = 0.0;
        for (stack_idx, stack) in shelf.stacks().iter().enumerate() {
            let mut stack_bottom = y_offset;
            for (level, game) in stack.games().iter().enumerate() {
                games.push(PositionedGame {
                    name: game.name().to_string(),
                    shelf: shelf_idx,
                    stack: stack_idx,
                    level,
                    rect: Rect::from_origin_and_size(
                        Vec2::new(x_offset, stack_bottom),
                        game.dimensions(),
                    ),
                });
                stack_bottom += game.height();
            }
            x_offset += stack.base_width() + STACK_GAP;
        }

        y_offset += shelf.max_height() + SHELF_GAP;
    }

    let longest = shelves
        .iter()
        .map(Shelf::max_length)
        .fold(0.0_f64, f64::max);

    ShelfLayout {
        games,
        baselines,
        bounds: Vec2::new(longest + MARGIN, y_offset + MARGIN),
    }
}
