//! Property tests for the allocator over random games and shelf sets.
//!
//! Dimensions are multiples of 0.25 so sums stay exact in f64.

use proptest::prelude::*;
use shelf_planner::model::{BoardGame, HeightRule, Shelf, ShelfBlueprint};
use shelf_planner::optimizer::{AllocationResult, allocate_games_to_shelves};

fn quarter(units: u32) -> f64 {
    f64::from(units) * 0.25
}

fn games_strategy() -> impl Strategy<Value = Vec<BoardGame>> {
    prop::collection::vec((1u32..=60, 1u32..=60), 0..40).prop_map(|dims| {
        dims.into_iter()
            .enumerate()
            .map(|(i, (w, h))| BoardGame::new(format!("g{i}"), quarter(w), quarter(h)).unwrap())
            .collect()
    })
}

fn blueprint_strategy() -> impl Strategy<Value = ShelfBlueprint> {
    (0usize..4, 4u32..=80, 4u32..=60).prop_map(|(count, length, height)| {
        ShelfBlueprint::new(count, quarter(length), quarter(height)).unwrap()
    })
}

fn run(games: &[BoardGame], blueprint: &ShelfBlueprint) -> AllocationResult {
    allocate_games_to_shelves(games.to_vec(), blueprint.instantiate().unwrap()).unwrap()
}

fn placed_names(shelves: &[Shelf]) -> Vec<String> {
    shelves
        .iter()
        .flat_map(|shelf| shelf.stacks())
        .flat_map(|stack| stack.games())
        .map(|game| game.name().to_string())
        .collect()
}

proptest! {
    #[test]
    fn every_game_is_placed_or_unplaced_exactly_once(
        games in games_strategy(),
        blueprint in blueprint_strategy(),
    ) {
        let result = run(&games, &blueprint);

        let mut seen = placed_names(&result.shelves);
        seen.extend(result.unplaced.iter().map(|u| u.game.name().to_string()));
        seen.sort();
        let mut expected: Vec<String> = games.iter().map(|g| g.name().to_string()).collect();
        expected.sort();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn stacks_respect_width_and_height(
        games in games_strategy(),
        blueprint in blueprint_strategy(),
    ) {
        let result = run(&games, &blueprint);

        for shelf in &result.shelves {
            for stack in shelf.stacks() {
                let total: f64 = stack.games().iter().map(BoardGame::height).sum();
                prop_assert!(total <= shelf.max_height());
                prop_assert!(stack.remaining_height() >= 0.0);
                for game in stack.games() {
                    prop_assert!(game.width() <= stack.base_width());
                }
                prop_assert_eq!(stack.games()[0].width(), stack.base_width());
            }
        }
    }

    #[test]
    fn footprints_never_exceed_shelf_length(
        games in games_strategy(),
        blueprint in blueprint_strategy(),
    ) {
        let result = run(&games, &blueprint);

        for shelf in &result.shelves {
            let used: f64 = shelf.stacks().iter().map(|s| s.base_width()).sum();
            prop_assert!(used <= shelf.max_length());
            prop_assert_eq!(shelf.remaining_length(), shelf.max_length() - used);
        }
    }

    #[test]
    fn repeated_runs_are_identical(
        games in games_strategy(),
        blueprint in blueprint_strategy(),
    ) {
        let first = run(&games, &blueprint);
        let second = run(&games, &blueprint);

        prop_assert_eq!(first.shelves, second.shelves);
        prop_assert_eq!(first.unplaced, second.unplaced);
    }

    #[test]
    fn unplaced_games_keep_input_order(
        games in games_strategy(),
        blueprint in blueprint_strategy(),
    ) {
        let result = run(&games, &blueprint);

        let positions: Vec<usize> = result
            .unplaced
            .iter()
            .map(|u| games.iter().position(|g| g.name() == u.game.name()).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn game_that_fits_an_existing_stack_never_opens_a_new_one(
        games in games_strategy(),
        blueprint in blueprint_strategy(),
    ) {
        for i in 0..games.len() {
            let before = run(&games[..i], &blueprint);
            let fits_existing = before
                .shelves
                .iter()
                .flat_map(|shelf| shelf.stacks())
                .any(|stack| stack.can_fit(&games[i]));
            if !fits_existing {
                continue;
            }

            let after = run(&games[..=i], &blueprint);
            prop_assert_eq!(before.stack_count(), after.stack_count());
            prop_assert_eq!(after.placed_count(), before.placed_count() + 1);
        }
    }

    #[test]
    fn only_over_tall_games_drive_a_stack_below_zero(
        games in games_strategy(),
        blueprint in blueprint_strategy(),
    ) {
        let result = run(&games, &blueprint.with_height_rule(HeightRule::Permissive));

        for shelf in &result.shelves {
            for stack in shelf.stacks() {
                if stack.remaining_height() < 0.0 {
                    prop_assert_eq!(stack.games().len(), 1);
                    prop_assert!(stack.games()[0].height() > shelf.max_height());
                }
            }
        }
    }
}
