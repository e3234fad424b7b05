//! dstar CLI - incremental grid pathfinding driver.
//!
//! - `dstar plan` - plan once, then repair incrementally after each wall toggle
//! - `dstar compare` - check incremental repair against a full replan after each toggle
//! - `dstar check` - parse a map and report its size

mod config;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use dstar_nav::{DStarPlanner, Grid, GridView, Position};

use crate::config::DriverConfig;
use crate::render::render;

#[derive(Parser)]
#[command(name = "dstar")]
#[command(about = "Incremental grid pathfinding driver", version)]
struct Cli {
    /// Config file (defaults to .dstar/config.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a path, then repair it after each toggle
    Plan(Scenario),

    /// Compare incremental repair with a full replan after each toggle
    Compare(Scenario),

    /// Parse a map and print its dimensions
    Check {
        /// Text map (O/. walkable, W/# blocked)
        #[arg(long)]
        map: PathBuf,
    },
}

#[derive(Args)]
struct Scenario {
    /// Text map (O/. walkable, W/# blocked)
    #[arg(long)]
    map: PathBuf,

    /// Start cell as x,y
    #[arg(long)]
    start: Position,

    /// Goal cell as x,y
    #[arg(long)]
    goal: Position,

    /// Cell to toggle between walkable and blocked, applied in order
    #[arg(long = "toggle", value_name = "X,Y")]
    toggles: Vec<Position>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let root = std::env::current_dir().context("Failed to get current directory")?;
    let config = DriverConfig::resolve(cli.config.as_deref(), &root)?;

    match cli.command {
        Commands::Plan(scenario) => run_plan(&config, &scenario),
        Commands::Compare(scenario) => run_compare(&config, &scenario),
        Commands::Check { map } => check_map(&map),
    }
}

fn load_map(path: &Path) -> Result<Grid> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read map from {}", path.display()))?;
    content
        .parse()
        .with_context(|| format!("Failed to parse map from {}", path.display()))
}

fn run_plan(config: &DriverConfig, scenario: &Scenario) -> Result<()> {
    let mut grid = load_map(&scenario.map)?;
    let mut planner = DStarPlanner::new(config.planner);
    let (start, goal) = (scenario.start, scenario.goal);

    let mut path = planner.find_path(&grid, start, goal);
    let stats = planner.last_stats();
    tracing::info!(
        len = path.len(),
        expansions = stats.expansions,
        "Initial plan"
    );
    if config.render_each_step {
        print!("{}", render(&grid, &path, start, goal));
        println!();
    }

    for &pos in &scenario.toggles {
        let Some(change) = grid.toggle(pos) else {
            tracing::warn!(%pos, "Toggle outside the map, skipped");
            continue;
        };
        planner.update_edge(&grid, change.position);
        let repair = planner.last_stats();

        path = planner.reconstruct_path(&grid, start, goal);
        tracing::info!(
            %pos,
            state = ?change.state,
            len = path.len(),
            expansions = repair.expansions,
            rhs_updates = repair.rhs_updates,
            "Repaired"
        );
        if config.render_each_step {
            print!("{}", render(&grid, &path, start, goal));
            println!();
        }
    }

    if !config.render_each_step {
        print!("{}", render(&grid, &path, start, goal));
    }
    if path.is_empty() {
        println!("no path from {start} to {goal}");
    } else {
        println!("path: {} cells, {} steps", path.len(), path.len() - 1);
    }
    Ok(())
}

fn run_compare(config: &DriverConfig, scenario: &Scenario) -> Result<()> {
    let mut grid = load_map(&scenario.map)?;
    let mut planner = DStarPlanner::new(config.planner);
    let (start, goal) = (scenario.start, scenario.goal);

    planner.find_path(&grid, start, goal);
    let full_expansions = planner.last_stats().expansions;

    let mut mismatches = 0usize;
    let mut repair_expansions = 0usize;

    for &pos in &scenario.toggles {
        if grid.toggle(pos).is_none() {
            tracing::warn!(%pos, "Toggle outside the map, skipped");
            continue;
        }
        planner.update_edge(&grid, pos);
        repair_expansions += planner.last_stats().expansions;

        let incremental = planner.reconstruct_path(&grid, start, goal);
        let fresh = DStarPlanner::new(config.planner).find_path(&grid, start, goal);

        if incremental == fresh {
            println!("{pos}: ok ({} cells)", incremental.len());
        } else {
            mismatches += 1;
            println!(
                "{pos}: MISMATCH incremental={} cells, full={} cells",
                incremental.len(),
                fresh.len()
            );
        }
    }

    println!(
        "initial plan expansions: {full_expansions}, repair expansions: {repair_expansions} over {} toggles",
        scenario.toggles.len()
    );

    if mismatches > 0 {
        bail!("{mismatches} toggles diverged from a full replan");
    }
    Ok(())
}

fn check_map(path: &Path) -> Result<()> {
    let grid = load_map(path)?;
    println!(
        "{}x{} cells, {} walkable, {} blocked",
        grid.width(),
        grid.height(),
        grid.walkable_count(),
        grid.cells().len() - grid.walkable_count()
    );
    Ok(())
}
