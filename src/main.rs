//! shelf-planner - greedy board game shelf allocation

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = shelf_planner::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
