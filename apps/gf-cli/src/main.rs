//! # gf-cli
//!
//! Command-line interface for the goal workflow.
//!
//! - `gf goal create/start/complete/stop/archive/list/status` — drive the
//!   goal lifecycle and its branch bindings
//! - `gf cleanup` — remove leftover branches of completed goals
//! - `gf sync issues/status/pr` — two-way GitHub issue synchronization
//! - `gf validate` — English-only content gate with optional auto-translate
//! - `gf config get/set` — stored configuration values

mod commands;
mod context;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use context::AppContext;
use tracing_subscriber::EnvFilter;

/// Goalflow CLI — goals, branches and issue sync.
#[derive(Parser)]
#[command(name = "gf", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Emit machine-readable JSON envelopes instead of human output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage goals and their lifecycle.
    Goal {
        #[command(subcommand)]
        command: commands::goal::GoalCommands,
    },
    /// Remove leftover branches of completed goals.
    Cleanup,
    /// Synchronize with GitHub issues and pull requests.
    Sync {
        #[command(subcommand)]
        command: commands::sync::SyncCommands,
    },
    /// Validate content against the English-only policy.
    Validate(commands::validate::ValidateArgs),
    /// Read and write stored configuration values.
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let app = AppContext::for_project(&project_root)?;

    match &cli.command {
        Commands::Goal { command } => commands::goal::execute(command, &app, cli.json).await,
        Commands::Cleanup => commands::goal::cleanup(&app, cli.json),
        Commands::Sync { command } => commands::sync::execute(command, &app, cli.json).await,
        Commands::Validate(args) => commands::validate::execute(args, &app, cli.json).await,
        Commands::Config { command } => commands::config::execute(command, &app),
    }
}
