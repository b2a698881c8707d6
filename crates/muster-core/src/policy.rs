//! Pluggable suspension policy.
//!
//! Whether the grace-period and expiry attributes participate in the target
//! suspension state has varied across operator deployments, so the decision
//! lives behind a trait and is selected once per run. The reconciliation loop
//! never branches on expiry attributes itself.

use chrono::NaiveDate;

use crate::record::DirectoryRecord;

/// Computes suspension-related targets for a matched or orphaned directory
/// record.
pub trait SuspensionPolicy: Send + Sync {
    /// Target suspended state for a record matched by a roster entry.
    ///
    /// `locked` is the roster's account-locked flag; the directory record
    /// carries the expiry attributes.
    fn target_suspended(&self, locked: bool, record: &DirectoryRecord, today: NaiveDate) -> bool;

    /// Whether an orphaned record is within a grace period and must be left
    /// alone this run instead of being deactivated.
    fn deactivation_deferred(&self, record: &DirectoryRecord, today: NaiveDate) -> bool;
}

/// Full semantics: honors `accountExpireDate` and `forceActiveUntilExpire`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpiryAware;

impl SuspensionPolicy for ExpiryAware {
    fn target_suspended(&self, locked: bool, record: &DirectoryRecord, today: NaiveDate) -> bool {
        if locked {
            // A future expire date plus the override keeps the account active
            // until the date passes.
            !(record.expires_in_future(today) && record.force_active_until_expire)
        } else {
            record.is_expired(today)
        }
    }

    fn deactivation_deferred(&self, record: &DirectoryRecord, today: NaiveDate) -> bool {
        record.expires_in_future(today)
    }
}

/// Simplified semantics: the roster lock flag is the whole story; expiry
/// attributes are ignored and orphans get no grace period.
#[derive(Debug, Clone, Copy, Default)]
pub struct RosterOnly;

impl SuspensionPolicy for RosterOnly {
    fn target_suspended(&self, locked: bool, _record: &DirectoryRecord, _today: NaiveDate) -> bool {
        locked
    }

    fn deactivation_deferred(&self, _record: &DirectoryRecord, _today: NaiveDate) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODAY: &str = "2026-08-27";

    fn record(expire: Option<&str>, force_active: bool) -> DirectoryRecord {
        DirectoryRecord {
            external_id: "1001".into(),
            user_key: "u-1001".into(),
            suspended: false,
            suspension_reason: String::new(),
            primary_address: String::new(),
            given_name: String::new(),
            family_name: String::new(),
            full_name: String::new(),
            org_unit_path: "/staff".into(),
            managed: None,
            expire_date: expire.map(|d| d.parse().unwrap()),
            force_active_until_expire: force_active,
            last_login: None,
        }
    }

    fn today() -> NaiveDate {
        TODAY.parse().unwrap()
    }

    #[test]
    fn locked_without_override_targets_suspended() {
        let policy = ExpiryAware;
        assert!(policy.target_suspended(true, &record(None, false), today()));
        // Future expiry alone is not enough without the override flag.
        assert!(policy.target_suspended(true, &record(Some("2026-12-31"), false), today()));
    }

    #[test]
    fn grace_override_keeps_locked_account_active() {
        let policy = ExpiryAware;
        assert!(!policy.target_suspended(true, &record(Some("2026-12-31"), true), today()));
        // Once the date has passed the override no longer applies.
        assert!(policy.target_suspended(true, &record(Some("2026-01-01"), true), today()));
    }

    #[test]
    fn unlocked_but_expired_targets_suspended() {
        let policy = ExpiryAware;
        assert!(policy.target_suspended(false, &record(Some("2026-01-01"), false), today()));
        assert!(!policy.target_suspended(false, &record(Some("2026-12-31"), false), today()));
        assert!(!policy.target_suspended(false, &record(None, false), today()));
    }

    #[test]
    fn deactivation_deferred_only_for_future_expiry() {
        let policy = ExpiryAware;
        assert!(policy.deactivation_deferred(&record(Some("2026-12-31"), false), today()));
        assert!(!policy.deactivation_deferred(&record(Some("2026-01-01"), false), today()));
        assert!(!policy.deactivation_deferred(&record(None, false), today()));
    }

    #[test]
    fn roster_only_ignores_expiry() {
        let policy = RosterOnly;
        assert!(!policy.target_suspended(false, &record(Some("2026-01-01"), false), today()));
        assert!(policy.target_suspended(true, &record(Some("2026-12-31"), true), today()));
        assert!(!policy.deactivation_deferred(&record(Some("2026-12-31"), false), today()));
    }
}
