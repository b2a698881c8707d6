//! Core record model and decision-support building blocks for muster.
//!
//! This crate holds everything the reconciliation engine needs that does not
//! touch the network: the normalized roster and directory record types, the
//! normalizer that filters malformed roster entries, the index structures used
//! for O(1) matching, and the pluggable suspension policy.

pub mod index;
pub mod normalize;
pub mod policy;
pub mod record;

pub use index::DirectoryIndex;
pub use normalize::{NormalizedRoster, SkipReason, SkippedEntry};
pub use policy::{ExpiryAware, RosterOnly, SuspensionPolicy};
pub use record::{DirectoryRecord, RawRosterEntry, RosterRecord};
