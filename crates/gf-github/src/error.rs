// error.rs — Error types for GitHub synchronization.
//
// Every variant here is non-fatal at the orchestrator boundary: sync
// failures are downgraded to warnings and never block a local transition.

use thiserror::Error;

/// Errors from the GitHub bridge.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Owner, repo or token are missing — the bridge is a no-op.
    #[error("GitHub sync not configured (owner, repo and token required)")]
    NotConfigured,

    /// The goal has no linked issue to sync to.
    #[error("goal {0} has no linked GitHub issue")]
    NotLinked(String),

    /// The HTTP request itself failed.
    #[error("GitHub request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// GitHub answered with a non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },
}
