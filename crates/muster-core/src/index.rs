//! Lookup structures for matching roster and directory records by key.

use std::collections::HashMap;

use tracing::warn;

use crate::record::DirectoryRecord;

/// Directory records keyed by external id for O(1) matching.
///
/// Pass A of reconciliation looks records up by the roster key; Pass B walks
/// the records that no roster key claimed. Successful name updates write back
/// into the index so later checks in the same run see current values.
#[derive(Debug, Default)]
pub struct DirectoryIndex {
    by_external_id: HashMap<String, DirectoryRecord>,
}

impl DirectoryIndex {
    /// Builds the index. Duplicate external ids are last-seen-wins; the
    /// collision is logged so the upstream duplicate can be fixed.
    pub fn build(records: Vec<DirectoryRecord>) -> Self {
        let mut by_external_id = HashMap::with_capacity(records.len());
        for record in records {
            let key = record.external_id.clone();
            if by_external_id.insert(key.clone(), record).is_some() {
                warn!(external_id = %key, "duplicate external id in directory, keeping last record");
            }
        }
        Self { by_external_id }
    }

    pub fn len(&self) -> usize {
        self.by_external_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_external_id.is_empty()
    }

    pub fn get(&self, external_id: &str) -> Option<&DirectoryRecord> {
        self.by_external_id.get(external_id)
    }

    pub fn get_mut(&mut self, external_id: &str) -> Option<&mut DirectoryRecord> {
        self.by_external_id.get_mut(external_id)
    }

    /// External ids present in the directory but absent from `roster_keys`,
    /// in ascending order for deterministic processing.
    pub fn orphans(&self, roster_keys: &HashMap<String, impl Sized>) -> Vec<&str> {
        let mut orphans: Vec<&str> = self
            .by_external_id
            .keys()
            .filter(|k| !roster_keys.contains_key(*k))
            .map(String::as_str)
            .collect();
        orphans.sort_unstable();
        orphans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RosterRecord;

    fn dir(external_id: &str, user_key: &str) -> DirectoryRecord {
        DirectoryRecord {
            external_id: external_id.into(),
            user_key: user_key.into(),
            suspended: false,
            suspension_reason: String::new(),
            primary_address: String::new(),
            given_name: String::new(),
            family_name: String::new(),
            full_name: String::new(),
            org_unit_path: "/staff".into(),
            managed: None,
            expire_date: None,
            force_active_until_expire: false,
            last_login: None,
        }
    }

    fn roster(external_id: &str) -> (String, RosterRecord) {
        (
            external_id.to_string(),
            RosterRecord {
                external_id: external_id.into(),
                user_name: "u".into(),
                display_name: String::new(),
                email: String::new(),
                sync_email: "u@example.org".into(),
                account_locked: false,
                given_name: String::new(),
                last_name: String::new(),
                org_assigned: false,
            },
        )
    }

    #[test]
    fn duplicate_key_keeps_last_record() {
        let index = DirectoryIndex::build(vec![dir("1001", "first"), dir("1001", "second")]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("1001").unwrap().user_key, "second");
    }

    #[test]
    fn orphans_are_sorted_and_exclude_matches() {
        let index = DirectoryIndex::build(vec![dir("3", "c"), dir("1", "a"), dir("2", "b")]);
        let roster: HashMap<_, _> = [roster("2")].into_iter().collect();
        assert_eq!(index.orphans(&roster), vec!["1", "3"]);
    }
}
