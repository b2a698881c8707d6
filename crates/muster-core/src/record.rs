//! Normalized record types shared by the roster and directory sides.

use chrono::{DateTime, NaiveDate, Utc};

/// A roster entry as it arrives from the report adapter, before validation.
///
/// Required fields are still optional here; the normalizer decides whether the
/// entry makes it into the working set. The adapter in `muster-roster` maps
/// whatever the current report revision calls its columns onto this shape.
#[derive(Debug, Clone, Default)]
pub struct RawRosterEntry {
    pub external_id: Option<String>,
    pub user_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub sync_email: Option<String>,
    pub account_locked: Option<String>,
    pub given_name: Option<String>,
    pub last_name: Option<String>,
    pub org_assigned: Option<String>,
}

/// A validated roster record, keyed by `external_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRecord {
    /// Stable numeric-looking key correlating this person to a directory user.
    pub external_id: String,
    pub user_name: String,
    /// Diagnostics only; never compared against the directory.
    pub display_name: String,
    /// Diagnostics only; the authoritative address is `sync_email`.
    pub email: String,
    /// Authoritative primary address / login source.
    pub sync_email: String,
    pub account_locked: bool,
    pub given_name: String,
    pub last_name: String,
    /// Determines organizational placement (assigned vs default unit).
    pub org_assigned: bool,
}

impl RosterRecord {
    /// Whether the authoritative address is plausible enough to create an
    /// account from. The directory rejects addresses without a domain part,
    /// so creation is not attempted for these.
    pub fn has_valid_sync_email(&self) -> bool {
        self.sync_email.contains('@')
    }
}

/// A directory user reduced to the fields reconciliation compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Value of the `organization`-typed external identifier; the join key.
    pub external_id: String,
    /// Opaque handle used to address the user for mutation.
    pub user_key: String,
    pub suspended: bool,
    /// Empty when the directory reports no reason. An empty reason on a
    /// suspended account blocks automatic reactivation.
    pub suspension_reason: String,
    pub primary_address: String,
    pub given_name: String,
    pub family_name: String,
    pub full_name: String,
    /// Slash-delimited hierarchical placement, e.g. `/staff/assigned`.
    pub org_unit_path: String,
    /// The `workdayManaged` tri-state: `None` or `Some(true)` means managed,
    /// `Some(false)` excludes the account from all mutation.
    pub managed: Option<bool>,
    /// Optional `accountExpireDate` (`yyyy-MM-dd`).
    pub expire_date: Option<NaiveDate>,
    /// When set together with a future `expire_date`, keeps a roster-locked
    /// account active until the date passes.
    pub force_active_until_expire: bool,
    /// Informational only.
    pub last_login: Option<DateTime<Utc>>,
}

impl DirectoryRecord {
    /// Managed accounts are mutable; an explicit `workdayManaged = false`
    /// opts the account out of everything.
    pub fn is_managed(&self) -> bool {
        self.managed != Some(false)
    }

    /// Whether `expire_date` is set and strictly before `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expire_date.is_some_and(|d| d < today)
    }

    /// Whether `expire_date` is set and strictly after `today`.
    pub fn expires_in_future(&self, today: NaiveDate) -> bool {
        self.expire_date.is_some_and(|d| d > today)
    }
}

/// Parses the roster's boolean-as-string convention: exactly `"True"` is
/// true, anything else (including absence) is false.
pub fn parse_locked_flag(raw: Option<&str>) -> bool {
    raw == Some("True")
}

/// Parses the org-assignment flag, which some report revisions emit as a
/// boolean string and others as numeric `1`.
pub fn parse_org_flag(raw: Option<&str>) -> bool {
    matches!(raw, Some("True") | Some("true") | Some("1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_expiry(expire: Option<&str>) -> DirectoryRecord {
        DirectoryRecord {
            external_id: "1001".into(),
            user_key: "u-1001".into(),
            suspended: false,
            suspension_reason: String::new(),
            primary_address: "a@example.org".into(),
            given_name: "Ada".into(),
            family_name: "Lovelace".into(),
            full_name: "Ada Lovelace".into(),
            org_unit_path: "/staff".into(),
            managed: None,
            expire_date: expire.map(|d| d.parse().unwrap()),
            force_active_until_expire: false,
            last_login: None,
        }
    }

    #[test]
    fn locked_flag_requires_exact_true() {
        assert!(parse_locked_flag(Some("True")));
        assert!(!parse_locked_flag(Some("true")));
        assert!(!parse_locked_flag(Some("False")));
        assert!(!parse_locked_flag(None));
    }

    #[test]
    fn org_flag_accepts_numeric_one() {
        assert!(parse_org_flag(Some("1")));
        assert!(parse_org_flag(Some("True")));
        assert!(!parse_org_flag(Some("0")));
        assert!(!parse_org_flag(None));
    }

    #[test]
    fn expiry_is_strict() {
        let today: NaiveDate = "2026-08-27".parse().unwrap();
        assert!(record_with_expiry(Some("2026-08-26")).is_expired(today));
        assert!(!record_with_expiry(Some("2026-08-27")).is_expired(today));
        assert!(record_with_expiry(Some("2026-08-28")).expires_in_future(today));
        assert!(!record_with_expiry(None).is_expired(today));
        assert!(!record_with_expiry(None).expires_in_future(today));
    }

    #[test]
    fn explicit_false_is_unmanaged() {
        let mut rec = record_with_expiry(None);
        assert!(rec.is_managed());
        rec.managed = Some(true);
        assert!(rec.is_managed());
        rec.managed = Some(false);
        assert!(!rec.is_managed());
    }
}
