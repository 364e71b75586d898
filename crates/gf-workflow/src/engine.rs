// engine.rs — WorkflowEngine: the goal lifecycle state machine.
//
// Transition table (status preconditions are checked here and nowhere
// else — no caller mutates status directly):
//
//   start    todo → in_progress   git steps first, persist after, sync soft
//   complete in_progress → done   persist first, branch delete soft
//   stop     in_progress → todo   git soft, persist, sync soft
//   cleanup  done + branch left   remote+local delete soft, per-goal errors
//   archive  done → archived      manual, no side effects

use std::sync::Arc;

use chrono::Utc;
use gf_git::{GitError, GitOps};
use gf_github::{GitHubError, IssueBridge, IssueSyncReport, PullStatus};
use gf_goal::{new_goal_id, EventDispatcher, GfEvent, Goal, GoalStatus, GoalStore, GoalUpdate};
use serde::Serialize;

use crate::config::WorkflowContext;
use crate::error::WorkflowError;
use crate::result::ActionResult;

/// Outcome of a cleanup pass over completed goals.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    /// Goal ids whose leftover branches were removed.
    pub cleaned: Vec<String>,
    /// Per-goal failures; the pass continues past them.
    pub errors: Vec<String>,
}

/// The orchestrator. Owns no state beyond its collaborators; all goal
/// state lives behind the storage contract.
pub struct WorkflowEngine {
    ctx: WorkflowContext,
    store: Arc<dyn GoalStore>,
    git: Arc<dyn GitOps>,
    github: Arc<dyn IssueBridge>,
    events: EventDispatcher,
}

impl WorkflowEngine {
    pub fn new(
        ctx: WorkflowContext,
        store: Arc<dyn GoalStore>,
        git: Arc<dyn GitOps>,
        github: Arc<dyn IssueBridge>,
    ) -> Self {
        Self {
            ctx,
            store,
            git,
            github,
            events: EventDispatcher::new(),
        }
    }

    /// Replace the event dispatcher (sinks are wired up by the host).
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    // ---- goal CRUD ------------------------------------------------------

    /// Create a new goal with a freshly generated id.
    pub fn create_goal(&self, title: &str, description: &str) -> ActionResult<Goal> {
        self.create_goal_inner(title, description)
            .unwrap_or_else(ActionResult::err)
    }

    fn create_goal_inner(
        &self,
        title: &str,
        description: &str,
    ) -> Result<ActionResult<Goal>, WorkflowError> {
        if title.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "goal title must not be empty".to_string(),
            ));
        }

        // Random ids can collide; retry a handful of times.
        for _ in 0..5 {
            let mut goal = Goal::new(new_goal_id(), title, self.ctx.default_status);
            goal.description = description.to_string();
            match self.store.create_goal(&goal) {
                Ok(()) => {
                    tracing::info!(goal = %goal.id, "goal created");
                    self.events.dispatch(&GfEvent::goal_created(&goal.id, title));
                    return Ok(ActionResult::ok(format!("goal {} created", goal.id), goal));
                }
                Err(gf_goal::GoalError::AlreadyExists(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(WorkflowError::Storage(
            "could not allocate a unique goal id".to_string(),
        ))
    }

    fn load_goal(&self, id: &str) -> Result<Goal, WorkflowError> {
        self.store
            .get_goal(id)?
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))
    }

    // ---- transitions ----------------------------------------------------

    /// todo → in_progress: bind the goal to a fresh feature branch.
    ///
    /// Every git step runs before anything is persisted, so a git failure
    /// leaves the store untouched.
    pub async fn start_goal(&self, id: &str) -> ActionResult<Goal> {
        match self.start_goal_inner(id).await {
            Ok(result) => result,
            Err(e) => ActionResult::err(e),
        }
    }

    async fn start_goal_inner(&self, id: &str) -> Result<ActionResult<Goal>, WorkflowError> {
        if !self.ctx.id_pattern.is_match(id) {
            return Err(WorkflowError::Validation(format!(
                "goal id {:?} does not match pattern {}",
                id,
                self.ctx.id_pattern.as_str()
            )));
        }

        let goal = self.load_goal(id)?;
        if goal.status != GoalStatus::Todo {
            return Err(WorkflowError::Validation(format!(
                "cannot start goal {}: status is {}, expected todo",
                id, goal.status
            )));
        }

        if !self.git.is_clean()? {
            return Err(WorkflowError::StateConflict(
                "working tree has uncommitted changes".to_string(),
            ));
        }

        let develop = &self.ctx.branches.develop;
        let remote = &self.ctx.branches.remote;
        let branch = self.ctx.feature_branch(id);

        self.git.checkout(develop)?;
        self.git.pull(remote, develop)?;
        self.git.create_branch(&branch)?;

        // Status and branch land in one write — never half-updated.
        let updated = self.store.update_goal(
            id,
            GoalUpdate {
                status: Some(GoalStatus::InProgress),
                branch_name: Some(Some(branch.clone())),
                ..GoalUpdate::default()
            },
        )?;

        tracing::info!(goal = id, branch = %branch, "goal started");
        self.events.dispatch(&GfEvent::goal_started(id, &branch));
        self.sync_status_soft(&updated).await;

        Ok(ActionResult::ok(
            format!("goal {} started on branch {}", id, branch),
            updated,
        ))
    }

    /// in_progress → done. Requires the goal's branch to be checked out.
    pub async fn complete_goal(&self, id: &str) -> ActionResult<Goal> {
        match self.complete_goal_inner(id).await {
            Ok(result) => result,
            Err(e) => ActionResult::err(e),
        }
    }

    async fn complete_goal_inner(&self, id: &str) -> Result<ActionResult<Goal>, WorkflowError> {
        let goal = self.load_goal(id)?;
        if goal.status != GoalStatus::InProgress {
            return Err(WorkflowError::Validation(format!(
                "cannot complete goal {}: status is {}, expected in_progress",
                id, goal.status
            )));
        }

        let branch = goal.branch_name.clone().ok_or_else(|| {
            WorkflowError::StateConflict(format!("goal {} has no branch recorded", id))
        })?;
        let current = self.git.current_branch()?;
        if current != branch {
            return Err(WorkflowError::StateConflict(format!(
                "goal {} expects branch {}, but {} is checked out",
                id, branch, current
            )));
        }

        // The status change is authoritative; everything after it is
        // disposable cleanup and must not roll it back.
        let mut updated = self.store.update_goal(
            id,
            GoalUpdate {
                status: Some(GoalStatus::Done),
                completed_at: Some(Some(Utc::now())),
                ..GoalUpdate::default()
            },
        )?;

        self.soft_git("checkout develop", || {
            self.git.checkout(&self.ctx.branches.develop)
        });
        match self.git.delete_branch(&branch) {
            Ok(()) => {
                updated = self.store.update_goal(
                    id,
                    GoalUpdate {
                        branch_name: Some(None),
                        ..GoalUpdate::default()
                    },
                )?;
            }
            Err(e) => {
                // Leftover branch; a later cleanup pass recovers it.
                tracing::warn!(goal = id, branch = %branch, "branch delete failed: {}", e);
            }
        }

        tracing::info!(goal = id, "goal completed");
        self.events.dispatch(&GfEvent::goal_completed(id));
        self.sync_status_soft(&updated).await;

        Ok(ActionResult::ok(format!("goal {} completed", id), updated))
    }

    /// in_progress → todo: abandon the branch, keep the goal.
    pub async fn stop_goal(&self, id: &str) -> ActionResult<Goal> {
        match self.stop_goal_inner(id).await {
            Ok(result) => result,
            Err(e) => ActionResult::err(e),
        }
    }

    async fn stop_goal_inner(&self, id: &str) -> Result<ActionResult<Goal>, WorkflowError> {
        let goal = self.load_goal(id)?;
        if goal.status != GoalStatus::InProgress {
            return Err(WorkflowError::Validation(format!(
                "cannot stop goal {}: status is {}, expected in_progress",
                id, goal.status
            )));
        }

        self.soft_git("checkout develop", || {
            self.git.checkout(&self.ctx.branches.develop)
        });
        if let Some(branch) = goal.branch_name.as_deref() {
            self.soft_git("delete branch", || self.git.delete_branch(branch));
        }

        let updated = self.store.update_goal(
            id,
            GoalUpdate {
                status: Some(GoalStatus::Todo),
                branch_name: Some(None),
                ..GoalUpdate::default()
            },
        )?;

        tracing::info!(goal = id, "goal stopped");
        self.events.dispatch(&GfEvent::goal_stopped(id));
        self.sync_status_soft(&updated).await;

        Ok(ActionResult::ok(format!("goal {} stopped", id), updated))
    }

    /// done → archived. Manual, terminal, no git or GitHub side effects.
    pub fn archive_goal(&self, id: &str) -> ActionResult<Goal> {
        self.archive_goal_inner(id).unwrap_or_else(ActionResult::err)
    }

    fn archive_goal_inner(&self, id: &str) -> Result<ActionResult<Goal>, WorkflowError> {
        let goal = self.load_goal(id)?;
        if goal.status != GoalStatus::Done {
            return Err(WorkflowError::Validation(format!(
                "cannot archive goal {}: status is {}, expected done",
                id, goal.status
            )));
        }
        let updated = self
            .store
            .update_goal(id, GoalUpdate::status(GoalStatus::Archived))?;
        Ok(ActionResult::ok(format!("goal {} archived", id), updated))
    }

    /// Remove leftover branches of done goals.
    ///
    /// Idempotent: a second pass over unchanged state cleans nothing.
    pub fn cleanup_completed_goals(&self) -> ActionResult<CleanupReport> {
        match self.cleanup_inner() {
            Ok(result) => result,
            Err(e) => ActionResult::err(e),
        }
    }

    fn cleanup_inner(&self) -> Result<ActionResult<CleanupReport>, WorkflowError> {
        let remote = &self.ctx.branches.remote;
        let mut report = CleanupReport::default();

        for goal in self.store.list_goals(Some(GoalStatus::Done))? {
            let Some(branch) = goal.branch_name.clone() else {
                continue;
            };

            // A branch already gone upstream is success, not an error.
            match self.git.delete_remote_branch(remote, &branch) {
                Ok(outcome) => {
                    tracing::debug!(goal = %goal.id, branch = %branch, ?outcome, "remote branch cleanup");
                }
                Err(e) => {
                    report.errors.push(format!("{}: {}", goal.id, e));
                    continue;
                }
            }
            self.soft_git("delete branch", || self.git.delete_branch(&branch));

            match self.store.update_goal(
                &goal.id,
                GoalUpdate {
                    branch_name: Some(None),
                    ..GoalUpdate::default()
                },
            ) {
                Ok(_) => {
                    self.events
                        .dispatch(&GfEvent::branch_cleaned(&goal.id, &branch));
                    report.cleaned.push(goal.id.clone());
                }
                Err(e) => report.errors.push(format!("{}: {}", goal.id, e)),
            }
        }

        let message = format!(
            "cleaned {} goal(s), {} error(s)",
            report.cleaned.len(),
            report.errors.len()
        );
        Ok(ActionResult::ok(message, report))
    }

    // ---- GitHub sync ----------------------------------------------------

    /// Pull open issues into goals.
    pub async fn sync_from_github(&self) -> ActionResult<IssueSyncReport> {
        match self.github.sync_issues_to_goals(self.store.as_ref()).await {
            Ok(report) => {
                let message = format!(
                    "issues synced: {} created, {} updated, {} error(s)",
                    report.created,
                    report.updated,
                    report.errors.len()
                );
                ActionResult::ok(message, report)
            }
            Err(GitHubError::NotConfigured) => {
                ActionResult::ok_empty("GitHub not configured — nothing to sync")
            }
            Err(e) => ActionResult::err(WorkflowError::GitHubSync(e.to_string())),
        }
    }

    /// Push one goal's status to its linked issue.
    pub async fn sync_goal_to_github(&self, id: &str) -> ActionResult<Goal> {
        let goal = match self.load_goal(id) {
            Ok(goal) => goal,
            Err(e) => return ActionResult::err(e),
        };
        match self.github.sync_goal_status(&goal).await {
            Ok(()) => {
                if let Some(issue) = goal.github_issue_id {
                    self.events.dispatch(&GfEvent::issue_synced(id, issue));
                }
                ActionResult::ok(format!("goal {} synced to GitHub", id), goal)
            }
            Err(GitHubError::NotConfigured) => {
                ActionResult::ok_empty("GitHub not configured — nothing to sync")
            }
            Err(GitHubError::NotLinked(_)) => ActionResult::err(WorkflowError::Validation(
                format!("goal {} has no linked GitHub issue", id),
            )),
            Err(e) => ActionResult::err(WorkflowError::GitHubSync(e.to_string())),
        }
    }

    /// Poll the goal's pull request; a merged PR completes the goal.
    ///
    /// The merge already happened remotely, so the local branch check of
    /// `complete_goal` is skipped — only the status flip and best-effort
    /// local cleanup run.
    pub async fn check_pull_request_status(&self, id: &str) -> ActionResult<PullStatus> {
        let goal = match self.load_goal(id) {
            Ok(goal) => goal,
            Err(e) => return ActionResult::err(e),
        };

        let status = match self.github.check_pull_request(&goal).await {
            Ok(status) => status,
            Err(GitHubError::NotConfigured) => {
                return ActionResult::ok_empty("GitHub not configured — nothing to check")
            }
            Err(e) => return ActionResult::err(WorkflowError::GitHubSync(e.to_string())),
        };

        match &status {
            PullStatus::Merged { number } => {
                if goal.status == GoalStatus::InProgress {
                    if let Err(e) = self.finish_merged_goal(&goal) {
                        return ActionResult::err(e);
                    }
                }
                ActionResult::ok(
                    format!("PR #{} merged — goal {} completed", number, id),
                    status,
                )
            }
            PullStatus::Open { number } => {
                ActionResult::ok(format!("PR #{} not merged yet", number), status)
            }
            PullStatus::NoPullRequest => {
                ActionResult::ok(format!("no pull request for goal {}", id), status)
            }
        }
    }

    fn finish_merged_goal(&self, goal: &Goal) -> Result<(), WorkflowError> {
        self.store.update_goal(
            &goal.id,
            GoalUpdate {
                status: Some(GoalStatus::Done),
                completed_at: Some(Some(Utc::now())),
                ..GoalUpdate::default()
            },
        )?;

        self.soft_git("checkout develop", || {
            self.git.checkout(&self.ctx.branches.develop)
        });
        if let Some(branch) = goal.branch_name.as_deref() {
            if self.git.delete_branch(branch).is_ok() {
                self.store.update_goal(
                    &goal.id,
                    GoalUpdate {
                        branch_name: Some(None),
                        ..GoalUpdate::default()
                    },
                )?;
            }
        }

        self.events.dispatch(&GfEvent::goal_completed(&goal.id));
        Ok(())
    }

    // ---- helpers --------------------------------------------------------

    /// Run a disposable git step; failure is logged, never propagated.
    fn soft_git(&self, what: &str, op: impl FnOnce() -> Result<(), GitError>) {
        if let Err(e) = op() {
            tracing::warn!("{} failed (continuing): {}", what, e);
        }
    }

    /// Mirror the goal to GitHub; failure never blocks the transition.
    async fn sync_status_soft(&self, goal: &Goal) {
        if goal.github_issue_id.is_none() {
            return;
        }
        match self.github.sync_goal_status(goal).await {
            Ok(()) => {
                if let Some(issue) = goal.github_issue_id {
                    self.events.dispatch(&GfEvent::issue_synced(&goal.id, issue));
                }
            }
            Err(GitHubError::NotConfigured) => {
                tracing::debug!(goal = %goal.id, "GitHub not configured, skipping sync");
            }
            Err(e) => {
                tracing::warn!(goal = %goal.id, "GitHub sync failed (continuing): {}", e);
            }
        }
    }
}
