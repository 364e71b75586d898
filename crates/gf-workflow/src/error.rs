// error.rs — The orchestrator's error taxonomy.
//
// Local/precondition errors (Validation, NotFound, StateConflict) abort
// the requested operation and surface verbatim. Git errors abort `start`
// before persistence. GitHubSync never escapes the orchestrator during a
// transition — it exists for the explicit sync operations.
//
// Variants carry plain strings so the envelope can clone and serialize
// them without dragging source errors along.

use gf_git::GitError;
use gf_goal::GoalError;
use serde::Serialize;
use thiserror::Error;

/// Why a workflow operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum WorkflowError {
    /// Malformed goal id, or wrong status for the requested transition.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown goal id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Repository state contradicts the transition (wrong branch checked
    /// out, dirty working tree).
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// A git subprocess failed.
    #[error("git operation failed: {0}")]
    Git(String),

    /// The storage contract failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// GitHub synchronization failed (non-fatal during transitions).
    #[error("GitHub sync failed: {0}")]
    GitHubSync(String),
}

impl From<GitError> for WorkflowError {
    fn from(e: GitError) -> Self {
        WorkflowError::Git(e.to_string())
    }
}

impl From<GoalError> for WorkflowError {
    fn from(e: GoalError) -> Self {
        match e {
            GoalError::NotFound(id) => WorkflowError::NotFound(id),
            other => WorkflowError::Storage(other.to_string()),
        }
    }
}
