//! # gf-github
//!
//! GitHub issue bridge: maps goals to GitHub issues and pull requests.
//!
//! The bridge is a mirror, not a source of truth — every operation here is
//! best-effort from the orchestrator's point of view, and all of them are
//! quiet no-ops (a distinguished `NotConfigured` error) when owner, repo or
//! token are missing. Callers treat that as expected, not exceptional.
//!
//! ## Operations
//!
//! - [`IssueBridge::sync_issues_to_goals`] — open issues → goals, with
//!   per-issue error aggregation (one malformed issue never aborts a batch)
//! - [`IssueBridge::sync_goal_status`] — idempotent status/label push onto
//!   the linked issue
//! - [`IssueBridge::check_pull_request`] — PR-merge polling with a
//!   distinguished [`PullStatus::Merged`] outcome

pub mod bridge;
pub mod client;
pub mod error;

pub use bridge::{IssueBridge, IssueSyncReport, PullStatus};
pub use client::{GitHubClient, GitHubConfig};
pub use error::GitHubError;
