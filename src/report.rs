//! Human-readable report of a finished allocation.

use std::fmt;

use crate::metrics::{shelf_utilization, stack_utilization};
use crate::model::Shelf;
use crate::optimizer::UnplacedGame;

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Builds the utilization summary, the placement listing and the list of
/// unplaced games (only when there are any).
pub fn render_report(shelves: &[Shelf], unplaced: &[UnplacedGame]) -> String {
    Report { shelves, unplaced }.to_string()
}

struct Report<'a> {
    shelves: &'a [Shelf],
    unplaced: &'a [UnplacedGame],
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Shelf & Stack Metrics ===")?;
        for (i, shelf) in self.shelves.iter().enumerate() {
            writeln!(
                f,
                "\nShelf {} utilization (horizontal): {}",
                i + 1,
                percent(shelf_utilization(shelf))
            )?;
            for (j, stack) in shelf.stacks().iter().enumerate() {
                writeln!(
                    f,
                    "  Stack {} utilization (vertical): {}",
                    j + 1,
                    percent(stack_utilization(shelf, stack))
                )?;
            }
        }

        for (i, shelf) in self.shelves.iter().enumerate() {
            writeln!(f, "\n=== Shelf {} ===", i + 1)?;
            writeln!(f, "Remaining horizontal length: {}", shelf.remaining_length())?;
            for (j, stack) in shelf.stacks().iter().enumerate() {
                writeln!(f, "  Stack {} (base width {})", j + 1, stack.base_width())?;
                for game in stack.games() {
                    writeln!(f, "     - {}", game)?;
                }
                writeln!(f, "     Remaining stack height: {}", stack.remaining_height())?;
            }
        }

        if !self.unplaced.is_empty() {
            writeln!(f, "\n=== Unplaced Games ===")?;
            for entry in self.unplaced {
                writeln!(f, " - {}", entry.game.name())?;
            }
        }

        Ok(())
    }
}
