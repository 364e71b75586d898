// goal.rs — Goal: the tracked unit of work.
//
// A Goal moves through a small lifecycle:
//   todo → in_progress → done → archived
//   (in_progress → todo when stopped)
//
// While in_progress it is bound to a Git feature branch; optionally it is
// mirrored to a GitHub issue via `github_issue_id`. Status changes are the
// orchestrator's job — this module only models the record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GoalError;

/// Default pattern a goal id must match: `g-` followed by six `[a-z0-9]`.
pub const DEFAULT_ID_PATTERN: &str = "^g-[a-z0-9]{6}$";

const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_SUFFIX_LEN: usize = 6;

/// Generate a fresh goal id matching [`DEFAULT_ID_PATTERN`].
pub fn new_goal_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
        .collect();
    format!("g-{}", suffix)
}

/// The lifecycle status of a [`Goal`].
///
/// `Archived` is terminal and only reachable through an explicit archive
/// operation — nothing transitions into it automatically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Todo,
    InProgress,
    Done,
    Archived,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalStatus::Todo => write!(f, "todo"),
            GoalStatus::InProgress => write!(f, "in_progress"),
            GoalStatus::Done => write!(f, "done"),
            GoalStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(GoalStatus::Todo),
            "in_progress" => Ok(GoalStatus::InProgress),
            "done" => Ok(GoalStatus::Done),
            "archived" => Ok(GoalStatus::Archived),
            other => Err(format!("unknown goal status: {}", other)),
        }
    }
}

/// A Goal — one tracked unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier (e.g., "g-a1b2c3"). Immutable once created.
    pub id: String,

    /// Human-readable title.
    pub title: String,

    /// Detailed description of what needs to be accomplished.
    #[serde(default)]
    pub description: String,

    /// Current lifecycle status.
    pub status: GoalStatus,

    /// Feature branch bound to this goal. Present while in_progress, and
    /// as a transient leftover on done goals pending cleanup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,

    /// Linked GitHub issue number. Stable external key — never changes
    /// once assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_issue_id: Option<i64>,

    /// When this goal was created.
    pub created_at: DateTime<Utc>,

    /// When this goal was last updated.
    pub updated_at: DateTime<Utc>,

    /// When this goal transitioned to done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Goal {
    /// Create a new goal in the given status with a caller-supplied id.
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: GoalStatus) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status,
            branch_name: None,
            github_issue_id: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Apply a partial update to this goal in place.
    ///
    /// Enforces the `github_issue_id` stability invariant: once linked,
    /// a goal cannot be relinked to a different issue. Bumps `updated_at`.
    pub fn apply(&mut self, update: GoalUpdate) -> Result<(), GoalError> {
        if let Some(issue) = update.github_issue_id {
            match self.github_issue_id {
                Some(existing) if existing != issue => {
                    return Err(GoalError::IssueRebind {
                        goal_id: self.id.clone(),
                        existing,
                        requested: issue,
                    });
                }
                _ => self.github_issue_id = Some(issue),
            }
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(branch_name) = update.branch_name {
            self.branch_name = branch_name;
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = completed_at;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// A partial update applied to a stored goal.
///
/// `None` means "leave unchanged". The doubly-wrapped fields distinguish
/// "leave unchanged" (`None`) from "clear" (`Some(None)`), so a status
/// change and its branch clear land in one atomic update.
#[derive(Debug, Clone, Default)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    pub branch_name: Option<Option<String>>,
    pub github_issue_id: Option<i64>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl GoalUpdate {
    /// Update that only touches the status.
    pub fn status(status: GoalStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
