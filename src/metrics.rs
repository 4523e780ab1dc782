//! Utilization figures for a finished allocation.
//!
//! Everything here reads the shelves without changing them.

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{Shelf, Stack};

/// Fraction of the shelf length taken by stack footprints.
pub fn shelf_utilization(shelf: &Shelf) -> f64 {
    (shelf.max_length() - shelf.remaining_length()) / shelf.max_length()
}

/// Fraction of the shelf height taken by the games in one stack.
///
/// Exceeds 1.0 only when a permissive shelf admitted an over-tall game.
pub fn stack_utilization(shelf: &Shelf, stack: &Stack) -> f64 {
    (shelf.max_height() - stack.remaining_height()) / shelf.max_height()
}

/// Vertical figures for one stack.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct StackMetrics {
    /// 1-based position from the left
    pub index: usize,
    pub base_width: f64,
    pub vertical_utilization: f64,
    pub used_height: f64,
    pub remaining_height: f64,
    pub game_count: usize,
}

/// Horizontal figures for one shelf plus its stacks.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ShelfMetrics {
    /// 1-based position from the top of the list
    pub index: usize,
    pub horizontal_utilization: f64,
    pub used_length: f64,
    pub remaining_length: f64,
    pub stacks: Vec<StackMetrics>,
}

impl ShelfMetrics {
    fn measure(index: usize, shelf: &Shelf) -> Self {
        Self {
            index,
            horizontal_utilization: shelf_utilization(shelf),
            used_length: shelf.used_length(),
            remaining_length: shelf.remaining_length(),
            stacks: shelf
                .stacks()
                .iter()
                .enumerate()
                .map(|(i, stack)| StackMetrics {
                    index: i + 1,
                    base_width: stack.base_width(),
                    vertical_utilization: stack_utilization(shelf, stack),
                    used_height: stack.used_height(),
                    remaining_height: stack.remaining_height(),
                    game_count: stack.games().len(),
                })
                .collect(),
        }
    }
}

/// Utilization of a whole shelf set.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct AllocationMetrics {
    pub shelves: Vec<ShelfMetrics>,
    pub placed_games: usize,
    pub unplaced_games: usize,
    pub stack_count: usize,
    /// Shelves holding at least one stack
    pub used_shelves: usize,
    /// Mean horizontal utilization over all shelves, 0 without shelves
    pub average_horizontal_utilization: f64,
}

impl AllocationMetrics {
    pub fn from_shelves(shelves: &[Shelf], unplaced_games: usize) -> Self {
        let per_shelf: Vec<ShelfMetrics> = shelves
            .iter()
            .enumerate()
            .map(|(i, shelf)| ShelfMetrics::measure(i + 1, shelf))
            .collect();

        let average_horizontal_utilization = if per_shelf.is_empty() {
            0.0
        } else {
            per_shelf
                .iter()
                .map(|s| s.horizontal_utilization)
                .sum::<f64>()
                / per_shelf.len() as f64
        };

        Self {
            placed_games: shelves.iter().map(Shelf::game_count).sum(),
            unplaced_games,
            stack_count: per_shelf.iter().map(|s| s.stacks.len()).sum(),
            used_shelves: shelves.iter().filter(|s| !s.stacks().is_empty()).count(),
            average_horizontal_utilization,
            shelves: per_shelf,
        }
    }
}
