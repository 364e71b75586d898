// ops.rs — The GitOps contract the orchestrator drives transitions through.

use crate::error::GitError;

/// Outcome of a remote branch deletion.
///
/// A branch that is already gone upstream is not an error during cleanup,
/// so it is reported distinguishably rather than folded into success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteDelete {
    Deleted,
    Missing,
}

/// Local repository operations backing goal transitions.
///
/// Each call either succeeds or returns a [`GitError`] carrying the
/// underlying tool's message. Policy (abort vs tolerate) lives with the
/// caller, not here.
pub trait GitOps: Send + Sync {
    /// True when the working tree has no uncommitted changes.
    fn is_clean(&self) -> Result<bool, GitError>;

    /// Name of the currently checked-out branch.
    fn current_branch(&self) -> Result<String, GitError>;

    /// Check out an existing branch.
    fn checkout(&self, branch: &str) -> Result<(), GitError>;

    /// Pull a branch from a remote.
    fn pull(&self, remote: &str, branch: &str) -> Result<(), GitError>;

    /// Create a new branch off the current HEAD and check it out.
    fn create_branch(&self, name: &str) -> Result<(), GitError>;

    /// Delete a local branch.
    fn delete_branch(&self, name: &str) -> Result<(), GitError>;

    /// Delete a branch on a remote. Reports a missing remote branch as
    /// [`RemoteDelete::Missing`] instead of an error.
    fn delete_remote_branch(&self, remote: &str, name: &str) -> Result<RemoteDelete, GitError>;

    /// Push a branch to a remote, optionally with `--force-with-lease`.
    fn push(&self, remote: &str, branch: &str, force_with_lease: bool) -> Result<(), GitError>;
}
