// error.rs — Error type for git subprocess operations.

use thiserror::Error;

/// A git operation failed.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git subprocess exited non-zero. Carries the underlying
    /// tool's message so the caller can surface it verbatim.
    #[error("git {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    /// The git binary could not be spawned at all.
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
}
