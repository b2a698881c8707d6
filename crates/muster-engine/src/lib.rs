//! Reconciliation engine: decides and applies the minimal set of directory
//! mutations that converge the directory to the roster.
//!
//! The pieces compose bottom-up: [`decision`] computes pure per-user plans,
//! [`planner`] orders the two passes over the working sets, [`apply`] executes
//! intents against a [`muster_directory::DirectoryStore`], and [`run`] drives
//! a whole pass under the failsafe mutation cap.

pub mod apply;
pub mod decision;
pub mod intent;
pub mod planner;
pub mod report;
pub mod run;

pub use apply::{Applier, ApplyMode};
pub use decision::{Decider, OrgUnits};
pub use intent::{Decision, Intent, Skip, SkipCause};
pub use planner::Planner;
pub use report::{MutationError, RunReport, RunState, RunStatus};
pub use run::{RunController, RunSettings};
