//! branch-sweep: prune branches already merged into a base branch
//!
//! Deletes merged branches from the hosting service (GitHub or GitLab) and
//! their local copies, plus local branches whose remote counterpart is gone.
//!
//! A run has three phases:
//! 1. [`sweep::gather`] syncs the clone, lists both branch universes and asks
//!    the host which branches were merged.
//! 2. [`sweep::create_deletion_plan`] decides, without I/O, what to delete.
//! 3. [`sweep::execute_plan`] performs the deletions and reports per action.

pub mod auth;
pub mod config;
pub mod deadline;
pub mod error;
pub mod git;
pub mod oracle;
pub mod platform;
pub mod process;
pub mod sweep;
pub mod types;
