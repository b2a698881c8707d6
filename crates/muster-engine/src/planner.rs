//! Ordering and working-set bookkeeping for the two reconciliation passes.

use std::collections::HashMap;

use muster_core::{DirectoryIndex, RosterRecord};

use crate::decision::Decider;
use crate::intent::Decision;

/// Holds both working sets for the duration of a run and yields per-user
/// decisions in deterministic order.
///
/// The directory index is the only state mutated mid-run: successful name
/// updates write back so later comparisons in the same run see the new
/// values.
pub struct Planner {
    roster: HashMap<String, RosterRecord>,
    index: DirectoryIndex,
}

impl Planner {
    pub fn new(roster: HashMap<String, RosterRecord>, index: DirectoryIndex) -> Self {
        Self { roster, index }
    }

    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    pub fn directory_len(&self) -> usize {
        self.index.len()
    }

    /// Pass A order: roster external ids, ascending.
    pub fn roster_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.roster.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Pass B order: directory-only external ids, ascending.
    pub fn orphan_ids(&self) -> Vec<String> {
        self.index
            .orphans(&self.roster)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn plan_roster_user(&self, external_id: &str, decider: &Decider<'_>) -> Option<Decision> {
        let roster = self.roster.get(external_id)?;
        Some(decider.plan_roster_user(roster, self.index.get(external_id)))
    }

    pub fn plan_orphan(&self, external_id: &str, decider: &Decider<'_>) -> Option<Decision> {
        self.index
            .get(external_id)
            .map(|record| decider.plan_orphan(record))
    }

    /// Records a successfully applied name update in the in-memory index.
    pub fn commit_name_update(&mut self, external_id: &str, given_name: &str, family_name: &str) {
        if let Some(record) = self.index.get_mut(external_id) {
            record.given_name = given_name.to_string();
            record.family_name = family_name.to_string();
            record.full_name = format!("{given_name} {family_name}");
        }
    }
}
