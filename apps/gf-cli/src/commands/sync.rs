// sync.rs — GitHub synchronization subcommands.

use clap::Subcommand;

use crate::context::AppContext;

use super::finish;

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Pull open GitHub issues into goals.
    Issues,
    /// Push one goal's status to its linked issue.
    Status {
        /// Goal id.
        id: String,
    },
    /// Poll the pull request bound to a goal's branch; a merged PR
    /// completes the goal.
    Pr {
        /// Goal id.
        id: String,
    },
}

pub async fn execute(cmd: &SyncCommands, app: &AppContext, json: bool) -> anyhow::Result<()> {
    let engine = app.engine()?;

    match cmd {
        SyncCommands::Issues => {
            if let Some(report) = finish(engine.sync_from_github().await, json)? {
                for err in &report.errors {
                    println!("  error: {}", err);
                }
            }
        }
        SyncCommands::Status { id } => {
            finish(engine.sync_goal_to_github(id).await, json)?;
        }
        SyncCommands::Pr { id } => {
            finish(engine.check_pull_request_status(id).await, json)?;
        }
    }
    Ok(())
}
