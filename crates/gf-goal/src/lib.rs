//! # gf-goal
//!
//! Goal data model, storage contract and lifecycle events for Goalflow.
//!
//! A [`Goal`] is the unit of work tracked by the workflow: it moves through
//! the `todo → in_progress → done` lifecycle, optionally bound to a Git
//! feature branch and a GitHub issue.
//!
//! ## Key components
//!
//! - [`Goal`] / [`GoalStatus`] — the tracked record and its lifecycle states
//! - [`GoalStore`] — the storage contract the orchestrator persists through
//! - [`JsonGoalStore`] — file-per-goal JSON implementation of the contract
//! - [`GfEvent`] — events emitted at key lifecycle points
//! - [`EventDispatcher`] / [`NotificationSink`] — event fan-out to sinks

pub mod error;
pub mod events;
pub mod goal;
pub mod store;

pub use error::GoalError;
pub use events::{EventDispatcher, GfEvent, LogSink, NotificationSink};
pub use goal::{new_goal_id, Goal, GoalStatus, GoalUpdate, DEFAULT_ID_PATTERN};
pub use store::{GoalStore, JsonGoalStore};
