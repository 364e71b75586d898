// error.rs — Error types for the goal storage subsystem.

use thiserror::Error;

/// Errors that can occur while persisting or loading goals.
#[derive(Debug, Error)]
pub enum GoalError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize/deserialize goal data.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The requested goal was not found.
    #[error("goal not found: {0}")]
    NotFound(String),

    /// A goal with this id already exists.
    #[error("goal already exists: {0}")]
    AlreadyExists(String),

    /// Attempt to rebind a goal to a different GitHub issue.
    /// `github_issue_id` is a stable external key and never changes once set.
    #[error("goal {goal_id} is already linked to issue #{existing}, refusing to relink to #{requested}")]
    IssueRebind {
        goal_id: String,
        existing: i64,
        requested: i64,
    },

    /// A notification dispatch failed (non-fatal).
    #[error("notification error: {0}")]
    Notification(String),
}
