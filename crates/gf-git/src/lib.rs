//! # gf-git
//!
//! Git branch synchronization for the goal workflow.
//!
//! Every goal transition is backed by a short sequence of local git
//! operations (clean-check, checkout, pull, create/delete branch). This
//! crate exposes them behind the [`GitOps`] trait; [`GitCli`] is the
//! subprocess implementation. There is no internal retry — git failures
//! are fast and deterministic (a dirty tree, a missing branch), and the
//! orchestrator decides hard-fail vs soft-fail per call site.

pub mod cli;
pub mod error;
pub mod ops;

pub use cli::GitCli;
pub use error::GitError;
pub use ops::{GitOps, RemoteDelete};
