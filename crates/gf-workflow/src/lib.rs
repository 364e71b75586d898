//! # gf-workflow
//!
//! The goal lifecycle orchestrator: the only component allowed to change
//! a goal's status. Transitions are backed by git operations and mirrored
//! to GitHub, with a strict hard-fail/soft-fail split:
//!
//! - `start` performs every git step *before* persisting anything, so a
//!   git failure never leaves the store and the repository inconsistent
//! - `complete`/`stop` persist the status change even when branch
//!   deletion fails — the branch is disposable cleanup, not authoritative
//!   state, and a later `cleanup` pass recovers it
//! - GitHub sync never blocks a local transition: GitHub is a mirror,
//!   not a source of truth
//!
//! Every operation returns the uniform [`ActionResult`] envelope.

pub mod config;
pub mod engine;
pub mod error;
pub mod result;

pub use config::{BranchSettings, GitHubSettings, GoalSettings, WorkflowConfig, WorkflowContext};
pub use engine::{CleanupReport, WorkflowEngine};
pub use error::WorkflowError;
pub use result::ActionResult;
