//! `impulse-check` binary entry point.
//!
//! # Responsibility
//! - Parse command-line arguments and resolve configuration.
//! - Open the goal database and registry once, then dispatch a command.
//! - Report corrupt state clearly without modifying the database file.

mod config;
mod keymap;
mod shell;
mod tui;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::{AppConfig, Overrides};
use impulse_core::db::open_db;
use impulse_core::{
    default_legacy_path, init_logging, Goal, GoalId, GoalRegistry, GoalStore, RegistryError,
    SqliteGoalStore,
};
use log::info;
use std::path::{Path, PathBuf};

const FAREWELL: &str = "Commitment is staying true to your future self. Keep going!";

#[derive(Parser)]
#[command(name = "impulse-check", version)]
#[command(about = "Track your impulses and build better habits")]
struct Cli {
    /// Goal database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive screen (default)
    Tui,
    /// List goals in creation order
    List,
    /// Create a new goal
    Create { name: String },
    /// Delete a goal by id or name
    Delete { goal: String },
    /// Show one goal by id or name
    Show { goal: String },
    /// Count one more impulse
    Inc { goal: String },
    /// Undo the last count
    Undo { goal: String },
    /// Import goals from the 1.x JSON state file
    ImportLegacy {
        /// Defaults to ~/.impulse_control.json
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(Overrides {
        db: cli.db,
        log_dir: cli.log_dir,
        log_level: cli.log_level,
    })?;

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let mut conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) if err.is_corrupt() => bail!(corrupt_message(&config.db_path, &err)),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("cannot open {}", config.db_path.display()))
        }
    };
    let opened = SqliteGoalStore::try_new(&mut conn)
        .map_err(RegistryError::from)
        .and_then(GoalRegistry::open);
    let mut registry = match opened {
        Ok(registry) => registry,
        Err(RegistryError::CorruptState(details)) => {
            bail!(corrupt_message(&config.db_path, &details))
        }
        Err(err) => return Err(err.into()),
    };

    let result = run(&mut registry, cli.command.unwrap_or(Commands::Tui));
    drop(registry);
    let status = if result.is_ok() { "ok" } else { "error" };
    info!("event=app_exit module=cli status={status}");
    result
}

fn run<S: GoalStore>(registry: &mut GoalRegistry<S>, command: Commands) -> Result<()> {
    match command {
        Commands::Tui => {
            tui::run_tui(registry)?;
            println!("\n {FAREWELL}");
        }
        Commands::List => {
            if registry.is_empty() {
                println!("No goals yet. Create one with `impulse-check create <name>`.");
            }
            for goal in registry.list() {
                print_goal_row(goal);
            }
        }
        Commands::Create { name } => {
            let goal = registry.create(&name)?;
            println!("Goal '{}' created successfully! ({})", goal.name, goal.id);
        }
        Commands::Delete { goal } => {
            let id = resolve_goal(registry, &goal)?;
            let removed = registry.delete(id)?;
            println!("Goal '{}' deleted successfully", removed.name);
        }
        Commands::Show { goal } => {
            let id = resolve_goal(registry, &goal)?;
            let goal = registry.get(id)?;
            println!("{}", goal.name);
            println!("  id:      {}", goal.id);
            println!("  count:   {}", goal.count);
            println!("  can undo: {}", if goal.can_undo() { "yes" } else { "no" });
            println!("  {}", shell::last_updated_label(goal));
        }
        Commands::Inc { goal } => {
            let id = resolve_goal(registry, &goal)?;
            let count = registry.increment(id)?.count;
            println!("Counter increased to {count}");
        }
        Commands::Undo { goal } => {
            let id = resolve_goal(registry, &goal)?;
            if registry.undo(id)? {
                println!("Counter reset to {}", registry.get(id)?.count);
            } else {
                println!("Nothing to undo; counter stays at 0");
            }
        }
        Commands::ImportLegacy { path } => {
            let path = match path.or_else(default_legacy_path) {
                Some(path) => path,
                None => bail!("no home directory found; pass the legacy file path"),
            };
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let report = registry.import_legacy_json(&json)?;
            println!(
                "Imported {} goal(s) from {}",
                report.imported.len(),
                path.display()
            );
            for name in &report.skipped {
                println!("  skipped '{name}' (already exists or blank)");
            }
        }
    }
    Ok(())
}

/// Resolves a goal by id, falling back to an exact name match.
fn resolve_goal<S: GoalStore>(registry: &GoalRegistry<S>, reference: &str) -> Result<GoalId> {
    let by_id = GoalId::parse_str(reference.trim())
        .ok()
        .and_then(|id| registry.get(id).ok());
    if let Some(goal) = by_id {
        return Ok(goal.id);
    }
    match registry.find_by_name(reference) {
        Some(goal) => Ok(goal.id),
        None => bail!("no goal named or identified by `{reference}`"),
    }
}

fn print_goal_row(goal: &Goal) {
    println!("{:>8}  {}  {}", goal.count, goal.id, goal.name);
}

fn corrupt_message(path: &Path, details: &dyn std::fmt::Display) -> String {
    format!(
        "saved goals at {} could not be read ({details}).\n\
         The file was left untouched; move it aside or restore a backup to continue.",
        path.display()
    )
}
