// events.rs — Lifecycle event model and notification dispatch.
//
// The workflow emits events at key lifecycle points. Notification sinks
// (log files, webhook scripts) subscribe to these events. Dispatch is
// synchronous; a failing sink is logged and never fails the operation
// that emitted the event.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GoalError;

/// Events emitted at key goal lifecycle points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GfEvent {
    /// A new goal was created.
    GoalCreated {
        goal_id: String,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// A goal entered in_progress and was bound to a feature branch.
    GoalStarted {
        goal_id: String,
        branch: String,
        timestamp: DateTime<Utc>,
    },

    /// A goal was completed.
    GoalCompleted {
        goal_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A goal was stopped and returned to todo.
    GoalStopped {
        goal_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A leftover branch was cleaned up for a done goal.
    BranchCleaned {
        goal_id: String,
        branch: String,
        timestamp: DateTime<Utc>,
    },

    /// A goal's state was mirrored to its GitHub issue.
    IssueSynced {
        goal_id: String,
        issue: i64,
        timestamp: DateTime<Utc>,
    },
}

impl GfEvent {
    /// Get the event type name as a string.
    pub fn event_type(&self) -> &str {
        match self {
            GfEvent::GoalCreated { .. } => "goal_created",
            GfEvent::GoalStarted { .. } => "goal_started",
            GfEvent::GoalCompleted { .. } => "goal_completed",
            GfEvent::GoalStopped { .. } => "goal_stopped",
            GfEvent::BranchCleaned { .. } => "branch_cleaned",
            GfEvent::IssueSynced { .. } => "issue_synced",
        }
    }

    pub fn goal_created(goal_id: &str, title: &str) -> Self {
        GfEvent::GoalCreated {
            goal_id: goal_id.to_string(),
            title: title.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn goal_started(goal_id: &str, branch: &str) -> Self {
        GfEvent::GoalStarted {
            goal_id: goal_id.to_string(),
            branch: branch.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn goal_completed(goal_id: &str) -> Self {
        GfEvent::GoalCompleted {
            goal_id: goal_id.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn goal_stopped(goal_id: &str) -> Self {
        GfEvent::GoalStopped {
            goal_id: goal_id.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn branch_cleaned(goal_id: &str, branch: &str) -> Self {
        GfEvent::BranchCleaned {
            goal_id: goal_id.to_string(),
            branch: branch.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn issue_synced(goal_id: &str, issue: i64) -> Self {
        GfEvent::IssueSynced {
            goal_id: goal_id.to_string(),
            issue,
            timestamp: Utc::now(),
        }
    }
}

/// Trait for receiving workflow events.
///
/// Implementations decide what to do with each event: log to a file,
/// call a webhook, etc. Errors are logged but don't stop the workflow.
pub trait NotificationSink: Send + Sync {
    fn send(&self, event: &GfEvent) -> Result<(), GoalError>;
}

/// Logs events as JSONL to a file (always-on sink).
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl NotificationSink for LogSink {
    fn send(&self, event: &GfEvent) -> Result<(), GoalError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| GoalError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| GoalError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json).map_err(|source| GoalError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}

/// Dispatches events to multiple sinks.
///
/// Errors from individual sinks are logged (via tracing) but don't
/// prevent other sinks from receiving the event.
#[derive(Default)]
pub struct EventDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl EventDispatcher {
    /// Create a new dispatcher with no sinks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a notification sink.
    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    /// Dispatch an event to all sinks.
    pub fn dispatch(&self, event: &GfEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(event) {
                tracing::warn!("notification sink error: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn event_serialization_round_trip() {
        let event = GfEvent::goal_started("g-abc123", "feature/g-abc123");
        let json = serde_json::to_string(&event).unwrap();
        let restored: GfEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event.event_type(), restored.event_type());
        assert!(json.contains("\"goal_started\""));
    }

    #[test]
    fn log_sink_appends_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let sink = LogSink::new(&path);

        sink.send(&GfEvent::goal_created("g-aaaaaa", "Goal 1")).unwrap();
        sink.send(&GfEvent::goal_completed("g-aaaaaa")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn dispatcher_sends_to_all_sinks() {
        let dir = tempdir().unwrap();
        let path1 = dir.path().join("sink1.jsonl");
        let path2 = dir.path().join("sink2.jsonl");

        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_sink(Box::new(LogSink::new(&path1)));
        dispatcher.add_sink(Box::new(LogSink::new(&path2)));

        dispatcher.dispatch(&GfEvent::issue_synced("g-abc123", 42));

        assert!(fs::read_to_string(&path1).unwrap().contains("issue_synced"));
        assert!(fs::read_to_string(&path2).unwrap().contains("issue_synced"));
    }
}
