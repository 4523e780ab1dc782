//! Command line interface: plan a shelf from a file or run the HTTP service.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::api::{AllocateResponse, start_api_server};
use crate::config::AppConfig;
use crate::loader::load_games_from_path;
use crate::model::{HeightRule, ShelfBlueprint};
use crate::optimizer::{AllocationEvent, OrderingStrategy, PlanningConfig, plan_with_progress};
use crate::render::{SvgOptions, render_shelves};
use crate::report::render_report;

#[derive(Parser)]
#[command(name = "shelf-planner")]
#[command(author, version, about = "Stack board games onto bookshelves")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Allocate the games in a table file and print the result
    Plan {
        /// Game table (.json, .csv, .tsv or .txt) with Name, Width and Height
        file: PathBuf,

        /// Number of shelves
        #[arg(long)]
        shelves: Option<usize>,

        /// Usable length of each shelf
        #[arg(long)]
        length: Option<f64>,

        /// Clearance height of each shelf
        #[arg(long)]
        height: Option<f64>,

        /// Game ordering (width_then_height, height_then_width, area, input)
        #[arg(long)]
        ordering: Option<OrderingStrategy>,

        /// Let games taller than the shelf start a stack
        #[arg(long)]
        permissive_height: bool,

        /// Write an SVG drawing of the shelves to this path
        #[arg(long, value_name = "OUT")]
        svg: Option<PathBuf>,

        /// Print the result as JSON instead of the text report
        #[arg(long)]
        json: bool,

        /// Print every allocation step
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Start the HTTP service with the web UI
    Serve {
        /// Port to listen on (overrides SHELF_PLANNER_API_PORT)
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    let app_config = AppConfig::from_env();

    match cli.command {
        Commands::Plan {
            file,
            shelves,
            length,
            height,
            ordering,
            permissive_height,
            svg,
            json,
            verbose,
        } => {
            let defaults = app_config.planner.planning_config();
            let overrides = PlanOverrides {
                shelves,
                length,
                height,
                ordering,
                permissive_height,
            };
            let config = overrides.apply(defaults)?;
            plan(&file, &config, svg.as_deref(), json, verbose)
        }
        Commands::Serve { port } => {
            let api_config = match port {
                Some(port) => app_config.api.with_port(port),
                None => app_config.api,
            };
            println!("🚀 Shelf planner service starting...");
            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime
                .block_on(start_api_server(api_config, app_config.planner))
                .context("HTTP server stopped with an error")
        }
    }
}

fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("⚠️ Could not load .env: {}", err);
        }
    }
}

/// Command line values that replace the configured defaults for one run.
#[derive(Debug, Default, Clone, Copy)]
struct PlanOverrides {
    shelves: Option<usize>,
    length: Option<f64>,
    height: Option<f64>,
    ordering: Option<OrderingStrategy>,
    permissive_height: bool,
}

impl PlanOverrides {
    fn apply(self, defaults: PlanningConfig) -> Result<PlanningConfig> {
        let base = defaults.shelves;
        let height_rule = if self.permissive_height {
            HeightRule::Permissive
        } else {
            base.height_rule
        };
        let shelves = ShelfBlueprint::new(
            self.shelves.unwrap_or(base.count),
            self.length.unwrap_or(base.length),
            self.height.unwrap_or(base.height),
        )
        .context("invalid shelf dimensions")?
        .with_height_rule(height_rule);

        Ok(PlanningConfig::builder()
            .shelves(shelves)
            .ordering(self.ordering.unwrap_or(defaults.ordering))
            .build())
    }
}

fn plan(
    file: &std::path::Path,
    config: &PlanningConfig,
    svg: Option<&std::path::Path>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let loaded = load_games_from_path(file)
        .with_context(|| format!("failed to load games from {}", file.display()))?;

    if !loaded.dropped_rows.is_empty() {
        let rows: Vec<String> = loaded.dropped_rows.iter().map(|r| r.to_string()).collect();
        eprintln!(
            "⚠️ Skipped {} row(s) with a missing field: {}",
            rows.len(),
            rows.join(", ")
        );
    }
    if verbose {
        eprintln!(
            "📥 {} games, {} shelves of {} x {}, ordering {}",
            loaded.games.len(),
            config.shelves.count,
            config.shelves.length,
            config.shelves.height,
            config.ordering
        );
    }

    let result = plan_with_progress(loaded.games, config, |evt| {
        if verbose {
            eprintln!("{}", describe_event(evt));
        }
    })?;

    if let Some(path) = svg {
        let drawing = render_shelves(&result.shelves, &SvgOptions::default());
        std::fs::write(path, drawing)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if verbose {
            eprintln!("🖼️ Wrote {}", path.display());
        }
    }

    if json {
        let response = AllocateResponse::from_allocation_result(result);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_report(&result.shelves, &result.unplaced));
    }

    Ok(())
}

fn describe_event(evt: &AllocationEvent) -> String {
    match evt {
        AllocationEvent::StackStarted {
            shelf,
            stack,
            base_width,
        } => format!("  ➕ shelf {shelf}: stack {stack} opened (base width {base_width})"),
        AllocationEvent::GamePlaced {
            shelf,
            stack,
            name,
            remaining_height,
            remaining_length,
            ..
        } => format!(
            "  📦 {name} -> shelf {shelf}, stack {stack} (stack height left {remaining_height}, shelf length left {remaining_length})"
        ),
        AllocationEvent::GameRejected {
            name, reason_text, ..
        } => format!("  ❌ {name}: {reason_text}"),
        AllocationEvent::Finished { placed, unplaced } => {
            format!("✅ {placed} placed, {unplaced} unplaced")
        }
    }
}
