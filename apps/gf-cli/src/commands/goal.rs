// goal.rs — Goal subcommands: create, start, complete, stop, archive,
// list, status. Plus the top-level cleanup pass.

use clap::Subcommand;
use gf_goal::{Goal, GoalStatus, GoalStore};

use crate::context::AppContext;

use super::finish;

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a new goal in todo.
    Create {
        /// Goal title (e.g., "Fix authentication bug").
        title: String,
        /// Detailed description of what needs to be accomplished.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Start a goal: bind it to a feature branch and move to in_progress.
    Start {
        /// Goal id (e.g., "g-a1b2c3").
        id: String,
    },
    /// Complete a goal: move to done and delete its branch.
    Complete {
        /// Goal id.
        id: String,
    },
    /// Stop a goal: return it to todo and abandon its branch.
    Stop {
        /// Goal id.
        id: String,
    },
    /// Archive a completed goal.
    Archive {
        /// Goal id.
        id: String,
    },
    /// List goals, newest first.
    List {
        /// Filter by status (todo, in_progress, done, archived).
        #[arg(long)]
        status: Option<GoalStatus>,
    },
    /// Show details for one goal.
    Status {
        /// Goal id.
        id: String,
    },
}

pub async fn execute(cmd: &GoalCommands, app: &AppContext, json: bool) -> anyhow::Result<()> {
    let engine = app.engine()?;

    match cmd {
        GoalCommands::Create { title, description } => {
            if let Some(goal) = finish(engine.create_goal(title, description), json)? {
                print_goal(&goal);
            }
        }
        GoalCommands::Start { id } => {
            finish(engine.start_goal(id).await, json)?;
        }
        GoalCommands::Complete { id } => {
            finish(engine.complete_goal(id).await, json)?;
        }
        GoalCommands::Stop { id } => {
            finish(engine.stop_goal(id).await, json)?;
        }
        GoalCommands::Archive { id } => {
            finish(engine.archive_goal(id), json)?;
        }
        GoalCommands::List { status } => list_goals(app, *status, json)?,
        GoalCommands::Status { id } => show_status(app, id, json)?,
    }
    Ok(())
}

pub fn cleanup(app: &AppContext, json: bool) -> anyhow::Result<()> {
    let engine = app.engine()?;
    if let Some(report) = finish(engine.cleanup_completed_goals(), json)? {
        for id in &report.cleaned {
            println!("  cleaned {}", id);
        }
        for err in &report.errors {
            println!("  error   {}", err);
        }
    }
    Ok(())
}

fn list_goals(app: &AppContext, status: Option<GoalStatus>, json: bool) -> anyhow::Result<()> {
    let goals = app.store.list_goals(status)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goals)?);
        return Ok(());
    }

    if goals.is_empty() {
        println!("No goals found.");
        return Ok(());
    }

    println!("{:<10} {:<12} {:<30} {:<24}", "ID", "STATUS", "TITLE", "BRANCH");
    println!("{}", "-".repeat(78));
    for g in &goals {
        println!(
            "{:<10} {:<12} {:<30} {:<24}",
            g.id,
            g.status.to_string(),
            truncate(&g.title, 28),
            g.branch_name.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

fn show_status(app: &AppContext, id: &str, json: bool) -> anyhow::Result<()> {
    let goal = app
        .store
        .get_goal(id)?
        .ok_or_else(|| anyhow::anyhow!("goal not found: {}", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goal)?);
        return Ok(());
    }

    print_goal(&goal);
    Ok(())
}

fn print_goal(goal: &Goal) {
    println!("Goal {}", goal.id);
    println!("  Title:   {}", goal.title);
    if !goal.description.is_empty() {
        println!("  Details: {}", goal.description);
    }
    println!("  Status:  {}", goal.status);
    if let Some(branch) = &goal.branch_name {
        println!("  Branch:  {}", branch);
    }
    if let Some(issue) = goal.github_issue_id {
        println!("  Issue:   #{}", issue);
    }
    println!("  Created: {}", goal.created_at.to_rfc3339());
    if let Some(completed) = goal.completed_at {
        println!("  Done at: {}", completed.to_rfc3339());
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
