//! Allocation logic for putting board games onto shelves.
//!
//! The allocator is a greedy first-fit heuristic with two passes per game:
//! 1. Put the game on top of the first existing stack (shelves in order,
//!    stacks left to right) that can take it.
//! 2. Otherwise open a new stack on the first shelf with enough length left.
//!
//! A game that fits neither way is reported as unplaced. Decisions are never
//! revisited, so the order of the input decides the outcome. Ordering is a
//! separate, caller-chosen `OrderingStrategy`.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::{BoardGame, PlacementError, Shelf, ShelfBlueprint, ValidationError};

/// Order in which games are fed to the allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderingStrategy {
    /// Widest first, ties broken by tallest first.
    #[default]
    WidthThenHeight,
    /// Tallest first, ties broken by widest first.
    HeightThenWidth,
    /// Largest front area first, ties broken by widest first.
    Area,
    /// Keep the order the games were supplied in.
    Input,
}

impl OrderingStrategy {
    pub const ALL: [OrderingStrategy; 4] = [
        OrderingStrategy::WidthThenHeight,
        OrderingStrategy::HeightThenWidth,
        OrderingStrategy::Area,
        OrderingStrategy::Input,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            OrderingStrategy::WidthThenHeight => "width_then_height",
            OrderingStrategy::HeightThenWidth => "height_then_width",
            OrderingStrategy::Area => "area",
            OrderingStrategy::Input => "input",
        }
    }

    /// Sorts the games in place.
    ///
    /// The sort is stable: games with equal keys keep their relative order.
    pub fn apply(&self, games: &mut [BoardGame]) {
        match self {
            OrderingStrategy::WidthThenHeight => games.sort_by(|a, b| {
                descending(a.width(), b.width()).then_with(|| descending(a.height(), b.height()))
            }),
            OrderingStrategy::HeightThenWidth => games.sort_by(|a, b| {
                descending(a.height(), b.height()).then_with(|| descending(a.width(), b.width()))
            }),
            OrderingStrategy::Area => games.sort_by(|a, b| {
                descending(a.area(), b.area()).then_with(|| descending(a.width(), b.width()))
            }),
            OrderingStrategy::Input => {}
        }
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

impl std::fmt::Display for OrderingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown ordering '{0}' (expected width_then_height, height_then_width, area or input)")]
pub struct UnknownOrdering(pub String);

impl FromStr for OrderingStrategy {
    type Err = UnknownOrdering;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        OrderingStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.code() == normalized)
            .ok_or_else(|| UnknownOrdering(raw.to_string()))
    }
}

/// Configuration for a complete planning run.
#[derive(Copy, Clone, Debug, Default)]
pub struct PlanningConfig {
    /// Shape and number of the shelves
    pub shelves: ShelfBlueprint,
    /// Order in which games are offered to the allocator
    pub ordering: OrderingStrategy,
}

impl PlanningConfig {
    pub fn builder() -> PlanningConfigBuilder {
        PlanningConfigBuilder::default()
    }
}

/// Builder for `PlanningConfig`.
#[derive(Clone, Debug, Default)]
pub struct PlanningConfigBuilder {
    config: PlanningConfig,
}

impl PlanningConfigBuilder {
    pub fn shelves(mut self, blueprint: ShelfBlueprint) -> Self {
        self.config.shelves = blueprint;
        self
    }

    pub fn ordering(mut self, ordering: OrderingStrategy) -> Self {
        self.config.ordering = ordering;
        self
    }

    pub fn build(self) -> PlanningConfig {
        self.config
    }
}

/// Result of an allocation run.
#[derive(Clone, Debug, PartialEq)]
pub struct AllocationResult {
    pub shelves: Vec<Shelf>,
    pub unplaced: Vec<UnplacedGame>,
}

impl AllocationResult {
    /// Whether every game found a place.
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    pub fn placed_count(&self) -> usize {
        self.shelves.iter().map(Shelf::game_count).sum()
    }

    pub fn unplaced_count(&self) -> usize {
        self.unplaced.len()
    }

    pub fn stack_count(&self) -> usize {
        self.shelves.iter().map(|s| s.stacks().len()).sum()
    }
}

/// Game that could not be placed.
#[derive(Clone, Debug, PartialEq)]
pub struct UnplacedGame {
    pub game: BoardGame,
    pub reason: UnplacedReason,
}

/// Why a game ended up unplaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnplacedReason {
    NoShelves,
    WiderThanEveryShelf,
    TallerThanEveryShelf,
    NoSpaceLeft,
}

impl UnplacedReason {
    pub fn code(&self) -> &'static str {
        match self {
            UnplacedReason::NoShelves => "no_shelves",
            UnplacedReason::WiderThanEveryShelf => "wider_than_every_shelf",
            UnplacedReason::TallerThanEveryShelf => "taller_than_every_shelf",
            UnplacedReason::NoSpaceLeft => "no_space_left",
        }
    }
}

impl std::fmt::Display for UnplacedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnplacedReason::NoShelves => write!(f, "No shelves are available"),
            UnplacedReason::WiderThanEveryShelf => {
                write!(f, "Game is wider than every shelf")
            }
            UnplacedReason::TallerThanEveryShelf => {
                write!(f, "Game is taller than every shelf it would fit along")
            }
            UnplacedReason::NoSpaceLeft => {
                write!(f, "No stack or free shelf length left for this game")
            }
        }
    }
}

fn determine_unfit_reason_across_shelves(shelves: &[Shelf], game: &BoardGame) -> UnplacedReason {
    if shelves.is_empty() {
        return UnplacedReason::NoShelves;
    }

    if shelves.iter().all(|shelf| game.width() > shelf.max_length()) {
        return UnplacedReason::WiderThanEveryShelf;
    }

    if shelves.iter().all(|shelf| !shelf.could_hold(game)) {
        return UnplacedReason::TallerThanEveryShelf;
    }

    UnplacedReason::NoSpaceLeft
}

/// Events emitted while allocating, for live views and verbose output.
///
/// Shelf and stack numbers are 1-based.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum AllocationEvent {
    /// A new stack was opened at the right end of a shelf.
    StackStarted {
        shelf: usize,
        stack: usize,
        base_width: f64,
    },
    /// A game was put on a stack.
    GamePlaced {
        shelf: usize,
        stack: usize,
        name: String,
        width: f64,
        height: f64,
        remaining_height: f64,
        remaining_length: f64,
    },
    /// A game could not be placed anywhere.
    GameRejected {
        name: String,
        width: f64,
        height: f64,
        reason_code: String,
        reason_text: String,
    },
    /// Allocation finished.
    Finished { placed: usize, unplaced: usize },
}

/// Places games onto shelves in the order given.
///
/// The input order is used as is; sort beforehand (see `OrderingStrategy`)
/// to control which games get the space first.
///
/// # Errors
/// Only if a placement precondition is violated, which indicates a defect.
/// Games that do not fit are returned in `AllocationResult::unplaced`.
pub fn allocate_games_to_shelves(
    games: Vec<BoardGame>,
    shelves: Vec<Shelf>,
) -> Result<AllocationResult, PlacementError> {
    allocate_with_progress(games, shelves, |_| {})
}

/// Orders the games per `config`, builds the shelves and allocates.
pub fn plan_with_config(
    games: Vec<BoardGame>,
    config: &PlanningConfig,
) -> Result<AllocationResult, PlanningError> {
    plan_with_progress(games, config, |_| {})
}

/// Like `plan_with_config`, reporting each step to `on_event`.
pub fn plan_with_progress(
    mut games: Vec<BoardGame>,
    config: &PlanningConfig,
    on_event: impl FnMut(&AllocationEvent),
) -> Result<AllocationResult, PlanningError> {
    let shelves = config.shelves.instantiate()?;
    config.ordering.apply(&mut games);
    Ok(allocate_with_progress(games, shelves, on_event)?)
}

/// Failure of a planning run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    #[error(transparent)]
    InvalidShelves(#[from] ValidationError),
    #[error("placement invariant violated: {0}")]
    Placement(#[from] PlacementError),
}

/// Allocation with a progress callback.
///
/// Calls `on_event` for every stack opened, game placed or rejected, and once
/// at the end.
pub fn allocate_with_progress(
    games: Vec<BoardGame>,
    mut shelves: Vec<Shelf>,
    mut on_event: impl FnMut(&AllocationEvent),
) -> Result<AllocationResult, PlacementError> {
    let mut unplaced: Vec<UnplacedGame> = Vec::new();
    let mut placed = 0usize;

    for game in games {
        let name = game.name().to_string();
        let (width, height) = (game.width(), game.height());

        // Existing stacks first
        let existing = shelves.iter().enumerate().find_map(|(shelf_idx, shelf)| {
            shelf
                .first_fitting_stack(&game)
                .map(|stack_idx| (shelf_idx, stack_idx))
        });

        let target = match existing {
            Some((shelf_idx, stack_idx)) => {
                shelves[shelf_idx].add_to_stack(stack_idx, game)?;
                Some((shelf_idx, stack_idx))
            }
            None => match shelves.iter().position(|shelf| shelf.can_start_new_stack(&game)) {
                Some(shelf_idx) => {
                    let shelf = &mut shelves[shelf_idx];
                    shelf.start_new_stack(game)?;
                    let stack_idx = shelf.stacks().len() - 1;
                    on_event(&AllocationEvent::StackStarted {
                        shelf: shelf_idx + 1,
                        stack: stack_idx + 1,
                        base_width: width,
                    });
                    Some((shelf_idx, stack_idx))
                }
                None => {
                    let reason = determine_unfit_reason_across_shelves(&shelves, &game);
                    on_event(&AllocationEvent::GameRejected {
                        name: name.clone(),
                        width,
                        height,
                        reason_code: reason.code().to_string(),
                        reason_text: reason.to_string(),
                    });
                    unplaced.push(UnplacedGame { game, reason });
                    None
                }
            },
        };

        if let Some((shelf_idx, stack_idx)) = target {
            placed += 1;
            let shelf = &shelves[shelf_idx];
            let remaining_height = shelf.stacks()[stack_idx].remaining_height();
            on_event(&AllocationEvent::GamePlaced {
                shelf: shelf_idx + 1,
                stack: stack_idx + 1,
                name,
                width,
                height,
                remaining_height,
                remaining_length: shelf.remaining_length(),
            });
        }
    }

    on_event(&AllocationEvent::Finished {
        placed,
        unplaced: unplaced.len(),
    });
    Ok(AllocationResult { shelves, unplaced })
}
