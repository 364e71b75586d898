// client.rs — GitHubClient: IssueBridge over the GitHub REST API.

use async_trait::async_trait;
use gf_goal::{new_goal_id, Goal, GoalError, GoalStatus, GoalStore, GoalUpdate};
use serde::Deserialize;
use serde_json::json;

use crate::bridge::{IssueBridge, IssueSyncReport, PullStatus};
use crate::error::GitHubError;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("goalflow/", env!("CARGO_PKG_VERSION"));

/// Repository coordinates for the bridge.
#[derive(Debug, Clone, Default)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
}

/// An open issue as the sync pass sees it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IssueView {
    pub number: i64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    /// Present when the "issue" is actually a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PullView {
    number: i64,
    #[serde(default)]
    state: String,
    #[serde(default)]
    merged_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelView {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IssueLabels {
    #[serde(default)]
    labels: Vec<LabelView>,
}

/// REST implementation of [`IssueBridge`].
pub struct GitHubClient {
    config: GitHubConfig,
    token: Option<String>,
    base_url: String,
    http: reqwest::Client,
}

impl GitHubClient {
    /// Initialize the client with repository coordinates and a token.
    /// An empty or missing token leaves the bridge unconfigured.
    pub fn new(config: GitHubConfig, token: Option<String>) -> Self {
        Self {
            config,
            token: token.filter(|t| !t.is_empty()),
            base_url: DEFAULT_API_BASE.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn require_configured(&self) -> Result<&str, GitHubError> {
        if !self.is_configured() {
            return Err(GitHubError::NotConfigured);
        }
        Ok(self.token.as_deref().unwrap_or_default())
    }

    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url, self.config.owner, self.config.repo, tail
        )
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GitHubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(GitHubError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn list_open_issues(&self, token: &str) -> Result<Vec<IssueView>, GitHubError> {
        let response = self
            .http
            .get(self.repo_url("issues?state=open&per_page=100"))
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

/// Map a goal status to the issue label that mirrors it.
pub(crate) fn status_label(status: GoalStatus) -> String {
    format!("status:{}", status)
}

/// Replace the `status:*` labels with the goal's current one, keeping
/// every unrelated label the issue already carries. The issues PATCH
/// endpoint treats `labels` as the full replacement set, so the merge has
/// to happen client-side.
pub(crate) fn merge_status_labels<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    status: GoalStatus,
) -> Vec<String> {
    let mut labels: Vec<String> = existing
        .into_iter()
        .filter(|l| !l.starts_with("status:"))
        .map(String::from)
        .collect();
    labels.push(status_label(status));
    labels
}

/// Pick the pull request that decides the goal's fate. A merged PR wins
/// over anything else; otherwise the newest open one counts; PRs that
/// were closed without merging are ignored.
fn classify_pulls(pulls: &[PullView]) -> PullStatus {
    if let Some(pr) = pulls.iter().find(|p| p.merged_at.is_some()) {
        return PullStatus::Merged { number: pr.number };
    }
    if let Some(pr) = pulls.iter().find(|p| p.state == "open") {
        return PullStatus::Open { number: pr.number };
    }
    PullStatus::NoPullRequest
}

/// Issue state mirroring the goal: closed once the work is done.
pub(crate) fn issue_state(status: GoalStatus) -> &'static str {
    match status {
        GoalStatus::Done | GoalStatus::Archived => "closed",
        GoalStatus::Todo | GoalStatus::InProgress => "open",
    }
}

/// Apply a batch of upstream issues to the goal store.
///
/// Pure sync logic, separated from HTTP so it can be exercised against a
/// real store in tests. Per-issue failures are collected, not propagated.
pub(crate) fn apply_issues(store: &dyn GoalStore, issues: Vec<IssueView>) -> IssueSyncReport {
    let mut report = IssueSyncReport::default();

    for issue in issues {
        // The issues endpoint also returns PRs; those are not work items.
        if issue.pull_request.is_some() {
            continue;
        }

        let result = match store.find_by_issue(issue.number) {
            Ok(Some(existing)) => update_goal_from_issue(store, &existing, &issue, &mut report),
            Ok(None) => create_goal_from_issue(store, &issue, &mut report),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!(issue = issue.number, "issue sync failed: {}", e);
            report.errors.push(format!("issue #{}: {}", issue.number, e));
        }
    }

    report
}

fn create_goal_from_issue(
    store: &dyn GoalStore,
    issue: &IssueView,
    report: &mut IssueSyncReport,
) -> Result<(), GoalError> {
    // Fresh random ids can collide with existing goals; retry a few times
    // before reporting the issue as failed.
    for _ in 0..5 {
        let mut goal = Goal::new(new_goal_id(), issue.title.clone(), GoalStatus::Todo);
        goal.description = issue.body.clone().unwrap_or_default();
        goal.github_issue_id = Some(issue.number);

        match store.create_goal(&goal) {
            Ok(()) => {
                tracing::info!(goal = %goal.id, issue = issue.number, "created goal from issue");
                report.created += 1;
                return Ok(());
            }
            Err(GoalError::AlreadyExists(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(GoalError::AlreadyExists(format!(
        "could not allocate id for issue #{}",
        issue.number
    )))
}

fn update_goal_from_issue(
    store: &dyn GoalStore,
    existing: &Goal,
    issue: &IssueView,
    report: &mut IssueSyncReport,
) -> Result<(), GoalError> {
    let body = issue.body.clone().unwrap_or_default();
    if existing.title == issue.title && existing.description == body {
        // Nothing drifted — an unchanged upstream is a no-op.
        return Ok(());
    }

    store.update_goal(
        &existing.id,
        GoalUpdate {
            title: Some(issue.title.clone()),
            description: Some(body),
            ..GoalUpdate::default()
        },
    )?;
    report.updated += 1;
    Ok(())
}

#[async_trait]
impl IssueBridge for GitHubClient {
    fn is_configured(&self) -> bool {
        !self.config.owner.is_empty() && !self.config.repo.is_empty() && self.token.is_some()
    }

    async fn sync_issues_to_goals(
        &self,
        store: &dyn GoalStore,
    ) -> Result<IssueSyncReport, GitHubError> {
        let token = self.require_configured()?.to_string();
        let issues = self.list_open_issues(&token).await?;
        tracing::info!(count = issues.len(), "syncing open issues to goals");
        Ok(apply_issues(store, issues))
    }

    async fn sync_goal_status(&self, goal: &Goal) -> Result<(), GitHubError> {
        let token = self.require_configured()?.to_string();
        let issue = goal
            .github_issue_id
            .ok_or_else(|| GitHubError::NotLinked(goal.id.clone()))?;

        // PATCH replaces the whole label set, so fetch the current labels
        // and merge: user labels like "bug" must survive the sync.
        let response = self
            .http
            .get(self.repo_url(&format!("issues/{}", issue)))
            .bearer_auth(&token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;
        let current: IssueLabels = Self::check(response).await?.json().await?;
        let labels = merge_status_labels(
            current.labels.iter().map(|l| l.name.as_str()),
            goal.status,
        );

        let body = json!({
            "state": issue_state(goal.status),
            "labels": labels,
        });

        let response = self
            .http
            .patch(self.repo_url(&format!("issues/{}", issue)))
            .bearer_auth(&token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;

        tracing::info!(goal = %goal.id, issue, status = %goal.status, "issue status synced");
        Ok(())
    }

    async fn check_pull_request(&self, goal: &Goal) -> Result<PullStatus, GitHubError> {
        let token = self.require_configured()?.to_string();
        let branch = match goal.branch_name.as_deref() {
            Some(b) => b,
            None => return Ok(PullStatus::NoPullRequest),
        };

        let url = self.repo_url(&format!(
            "pulls?state=all&head={}:{}",
            self.config.owner, branch
        ));
        let response = self
            .http
            .get(url)
            .bearer_auth(&token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;
        let pulls: Vec<PullView> = Self::check(response).await?.json().await?;

        Ok(classify_pulls(&pulls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_goal::JsonGoalStore;
    use tempfile::tempdir;

    fn issue(number: i64, title: &str, body: Option<&str>) -> IssueView {
        IssueView {
            number,
            title: title.to_string(),
            body: body.map(String::from),
            pull_request: None,
        }
    }

    #[test]
    fn unconfigured_bridge_reports_not_configured() {
        let client = GitHubClient::new(GitHubConfig::default(), None);
        assert!(!client.is_configured());
        assert!(matches!(
            client.require_configured(),
            Err(GitHubError::NotConfigured)
        ));

        // Owner/repo without a token is still unconfigured.
        let client = GitHubClient::new(
            GitHubConfig {
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
            },
            Some(String::new()),
        );
        assert!(!client.is_configured());
    }

    #[test]
    fn configured_with_all_three() {
        let client = GitHubClient::new(
            GitHubConfig {
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
            },
            Some("ghp_test".to_string()),
        );
        assert!(client.is_configured());
    }

    #[test]
    fn status_label_and_state_mapping() {
        assert_eq!(status_label(GoalStatus::InProgress), "status:in_progress");
        assert_eq!(issue_state(GoalStatus::Todo), "open");
        assert_eq!(issue_state(GoalStatus::InProgress), "open");
        assert_eq!(issue_state(GoalStatus::Done), "closed");
        assert_eq!(issue_state(GoalStatus::Archived), "closed");
    }

    #[test]
    fn merging_labels_keeps_unrelated_ones() {
        let merged = merge_status_labels(
            ["bug", "priority:high", "status:todo"],
            GoalStatus::InProgress,
        );
        assert_eq!(merged, vec!["bug", "priority:high", "status:in_progress"]);
    }

    #[test]
    fn merging_labels_never_stacks_status_labels() {
        // Re-syncing the same status yields exactly one status label.
        let merged = merge_status_labels(["status:done", "docs"], GoalStatus::Done);
        assert_eq!(merged, vec!["docs", "status:done"]);

        let merged = merge_status_labels([], GoalStatus::Todo);
        assert_eq!(merged, vec!["status:todo"]);
    }

    fn pull(number: i64, state: &str, merged_at: Option<&str>) -> PullView {
        PullView {
            number,
            state: state.to_string(),
            merged_at: merged_at.map(String::from),
        }
    }

    #[test]
    fn classify_prefers_merged_over_newer_open() {
        let pulls = vec![pull(9, "open", None), pull(5, "closed", Some("2026-08-01"))];
        assert_eq!(classify_pulls(&pulls), PullStatus::Merged { number: 5 });
    }

    #[test]
    fn classify_ignores_closed_unmerged_pulls() {
        // A closed-without-merge PR first in the list must not shadow the
        // open one behind it.
        let pulls = vec![pull(3, "closed", None), pull(8, "open", None)];
        assert_eq!(classify_pulls(&pulls), PullStatus::Open { number: 8 });

        let only_abandoned = vec![pull(3, "closed", None)];
        assert_eq!(classify_pulls(&only_abandoned), PullStatus::NoPullRequest);

        assert_eq!(classify_pulls(&[]), PullStatus::NoPullRequest);
    }

    #[test]
    fn apply_issues_creates_goals_for_new_issues() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();

        let report = apply_issues(
            &store,
            vec![
                issue(1, "Fix login", Some("Login is broken")),
                issue(2, "Add search", None),
            ],
        );

        assert_eq!(report.created, 2);
        assert_eq!(report.updated, 0);
        assert!(report.errors.is_empty());

        let linked = store.find_by_issue(1).unwrap().unwrap();
        assert_eq!(linked.title, "Fix login");
        assert_eq!(linked.description, "Login is broken");
        assert_eq!(linked.status, GoalStatus::Todo);
    }

    #[test]
    fn apply_issues_skips_pull_requests() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();

        let mut pr = issue(9, "A pull request", None);
        pr.pull_request = Some(serde_json::json!({"url": "x"}));

        let report = apply_issues(&store, vec![pr]);
        assert_eq!(report.created, 0);
        assert!(store.find_by_issue(9).unwrap().is_none());
    }

    #[test]
    fn apply_issues_second_run_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();

        let upstream = vec![issue(1, "Fix login", Some("body")), issue(2, "Search", None)];

        let first = apply_issues(&store, upstream.clone());
        assert_eq!(first.created, 2);

        // Unchanged upstream: nothing created, nothing updated.
        let second = apply_issues(&store, upstream);
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 0);
        assert!(second.errors.is_empty());
    }

    #[test]
    fn apply_issues_updates_drifted_titles() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();

        apply_issues(&store, vec![issue(1, "Old title", None)]);
        let report = apply_issues(&store, vec![issue(1, "New title", None)]);

        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 1);
        assert_eq!(store.find_by_issue(1).unwrap().unwrap().title, "New title");
    }

    #[test]
    fn pull_status_merged_is_distinguished() {
        let merged = PullStatus::Merged { number: 5 };
        let open = PullStatus::Open { number: 5 };
        assert_ne!(merged, open);

        let json = serde_json::to_string(&merged).unwrap();
        assert!(json.contains("\"merged\""));
    }
}
