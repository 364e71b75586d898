// bridge.rs — The IssueBridge contract and its result types.

use async_trait::async_trait;
use gf_goal::{Goal, GoalStore};
use serde::{Deserialize, Serialize};

use crate::error::GitHubError;

/// Aggregated outcome of an issues → goals sync pass.
///
/// Partial-failure semantics: a single malformed issue lands in `errors`
/// and the rest of the batch proceeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueSyncReport {
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<String>,
}

/// Outcome of polling the pull request bound to a goal's branch.
///
/// `Merged` is a distinguished condition, not a plain success: the caller
/// special-cases it into a status flip, while `Open`/`NoPullRequest` are
/// ordinary "nothing to do yet" results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pull", rename_all = "snake_case")]
pub enum PullStatus {
    Merged { number: i64 },
    Open { number: i64 },
    NoPullRequest,
}

/// Two-way synchronization between goals and GitHub issues.
#[async_trait]
pub trait IssueBridge: Send + Sync {
    /// True when owner, repo and token are all present.
    fn is_configured(&self) -> bool;

    /// Pull open issues and create/update the corresponding goals.
    async fn sync_issues_to_goals(
        &self,
        store: &dyn GoalStore,
    ) -> Result<IssueSyncReport, GitHubError>;

    /// Push the goal's current status onto its linked issue
    /// (state + `status:*` label). Idempotent.
    async fn sync_goal_status(&self, goal: &Goal) -> Result<(), GitHubError>;

    /// Poll the pull request associated with the goal's branch.
    async fn check_pull_request(&self, goal: &Goal) -> Result<PullStatus, GitHubError>;
}
