//! Roster normalization: raw report entries in, validated working set out.

use std::collections::HashMap;

use tracing::warn;

use crate::record::{parse_locked_flag, parse_org_flag, RawRosterEntry, RosterRecord};

/// Why a raw roster entry was excluded from the working set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingExternalId,
    MissingUserName,
    /// The external id contains at least one alphabetic character; these are
    /// placeholder rows in the report, not real personnel.
    NonNumericId,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingExternalId => write!(f, "missing external id"),
            Self::MissingUserName => write!(f, "missing user name"),
            Self::NonNumericId => write!(f, "non-numeric external id"),
        }
    }
}

/// An excluded roster entry, reported but never fatal.
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    /// Best available handle for the operator: display name, then user name,
    /// then external id, then a placeholder.
    pub who: String,
    pub reason: SkipReason,
}

/// The validated roster working set plus everything that was filtered out.
#[derive(Debug, Default)]
pub struct NormalizedRoster {
    pub records: HashMap<String, RosterRecord>,
    pub skipped: Vec<SkippedEntry>,
}

impl NormalizedRoster {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Builds the roster working set, excluding entries that lack a usable key or
/// user name. Exclusions are logged and collected, never fatal; duplicate
/// external ids are last-seen-wins with a warning.
pub fn normalize_roster(entries: Vec<RawRosterEntry>) -> NormalizedRoster {
    let mut out = NormalizedRoster::default();

    for entry in entries {
        let who = entry
            .display_name
            .clone()
            .or_else(|| entry.user_name.clone())
            .or_else(|| entry.external_id.clone())
            .unwrap_or_else(|| "<unidentified entry>".to_string());

        let Some(external_id) = entry.external_id.clone().filter(|s| !s.is_empty()) else {
            warn!(who = %who, "roster entry skipped: missing external id");
            out.skipped.push(SkippedEntry {
                who,
                reason: SkipReason::MissingExternalId,
            });
            continue;
        };

        let Some(user_name) = entry.user_name.clone().filter(|s| !s.is_empty()) else {
            warn!(who = %who, external_id = %external_id, "roster entry skipped: missing user name");
            out.skipped.push(SkippedEntry {
                who,
                reason: SkipReason::MissingUserName,
            });
            continue;
        };

        if external_id.chars().any(|c| c.is_alphabetic()) {
            warn!(who = %who, external_id = %external_id, "roster entry skipped: non-numeric external id");
            out.skipped.push(SkippedEntry {
                who,
                reason: SkipReason::NonNumericId,
            });
            continue;
        }

        let record = RosterRecord {
            external_id: external_id.clone(),
            user_name,
            display_name: entry.display_name.unwrap_or_default(),
            email: entry.email.unwrap_or_default(),
            sync_email: entry.sync_email.unwrap_or_default(),
            account_locked: parse_locked_flag(entry.account_locked.as_deref()),
            given_name: entry.given_name.unwrap_or_default(),
            last_name: entry.last_name.unwrap_or_default(),
            org_assigned: parse_org_flag(entry.org_assigned.as_deref()),
        };

        if out.records.insert(external_id.clone(), record).is_some() {
            warn!(external_id = %external_id, "duplicate external id in roster, keeping last entry");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(external_id: &str, user_name: &str) -> RawRosterEntry {
        RawRosterEntry {
            external_id: Some(external_id.to_string()),
            user_name: Some(user_name.to_string()),
            sync_email: Some(format!("{user_name}@example.org")),
            ..Default::default()
        }
    }

    #[test]
    fn valid_entries_are_kept() {
        let roster = normalize_roster(vec![entry("1001", "ada"), entry("1002", "grace")]);
        assert_eq!(roster.len(), 2);
        assert!(roster.skipped.is_empty());
        assert_eq!(roster.records["1001"].user_name, "ada");
    }

    #[test]
    fn lettered_external_ids_are_excluded_and_reported() {
        let roster = normalize_roster(vec![entry("C1001", "contractor"), entry("1002", "grace")]);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.skipped.len(), 1);
        assert_eq!(roster.skipped[0].reason, SkipReason::NonNumericId);
        assert_eq!(roster.skipped[0].who, "contractor");
    }

    #[test]
    fn missing_required_fields_are_excluded() {
        let mut no_id = entry("", "ada");
        no_id.external_id = None;
        let mut blank_name = entry("1003", "");
        blank_name.user_name = Some(String::new());

        let roster = normalize_roster(vec![no_id, blank_name]);
        assert!(roster.is_empty());
        assert_eq!(roster.skipped[0].reason, SkipReason::MissingExternalId);
        assert_eq!(roster.skipped[1].reason, SkipReason::MissingUserName);
    }

    #[test]
    fn duplicate_key_keeps_last_entry() {
        let mut first = entry("1001", "first");
        first.given_name = Some("First".into());
        let second = entry("1001", "second");

        let roster = normalize_roster(vec![first, second]);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.records["1001"].user_name, "second");
    }

    #[test]
    fn flags_are_parsed() {
        let mut e = entry("1001", "ada");
        e.account_locked = Some("True".into());
        e.org_assigned = Some("1".into());
        let roster = normalize_roster(vec![e]);
        let rec = &roster.records["1001"];
        assert!(rec.account_locked);
        assert!(rec.org_assigned);
    }
}
