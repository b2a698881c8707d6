//! Pure per-user decision logic.
//!
//! Everything here is side-effect free and synchronous: given a roster record
//! and the matching directory record (or its absence), compute the mutations
//! and reasoned skips for that user. Field checks run in a fixed order (lock
//! state, email, name, org unit) so diagnostic output is stable.

use chrono::NaiveDate;

use muster_core::{DirectoryRecord, RosterRecord, SuspensionPolicy};

use crate::intent::{Decision, Intent, Skip, SkipCause};

/// The three org-unit destinations reconciliation places accounts under.
#[derive(Debug, Clone)]
pub struct OrgUnits {
    /// Placement for roster records with the assignment flag set.
    pub assigned: String,
    /// Placement for everyone else on the roster.
    pub default_unit: String,
    /// Placement for deactivated orphans.
    pub disabled: String,
}

impl OrgUnits {
    fn target_for(&self, roster: &RosterRecord) -> &str {
        if roster.org_assigned {
            &self.assigned
        } else {
            &self.default_unit
        }
    }
}

/// Computes decisions for one run. Holds the run-scoped inputs the per-user
/// logic needs: the suspension policy, org-unit targets, the email-update
/// toggle, and the date mutations are evaluated against.
pub struct Decider<'a> {
    pub policy: &'a dyn SuspensionPolicy,
    pub org_units: &'a OrgUnits,
    pub apply_email_updates: bool,
    pub today: NaiveDate,
}

impl Decider<'_> {
    /// Pass A verdict for one roster record.
    pub fn plan_roster_user(
        &self,
        roster: &RosterRecord,
        directory: Option<&DirectoryRecord>,
    ) -> Decision {
        match directory {
            None => self.plan_create(roster),
            Some(record) => self.plan_matched(roster, record),
        }
    }

    fn plan_create(&self, roster: &RosterRecord) -> Decision {
        let mut decision = Decision::default();

        if !roster.has_valid_sync_email() {
            decision.skips.push(Skip {
                external_id: roster.external_id.clone(),
                cause: SkipCause::InvalidEmail {
                    address: roster.sync_email.clone(),
                },
            });
            return decision;
        }

        decision.intents.push(Intent::Create {
            external_id: roster.external_id.clone(),
            primary_address: roster.sync_email.to_lowercase(),
            given_name: roster.given_name.clone(),
            family_name: roster.last_name.clone(),
            org_unit: self.org_units.target_for(roster).to_string(),
            suspended: roster.account_locked,
        });
        decision
    }

    fn plan_matched(&self, roster: &RosterRecord, record: &DirectoryRecord) -> Decision {
        let mut decision = Decision::default();

        if !record.is_managed() {
            let cause = match record.expire_date.filter(|_| record.is_expired(self.today)) {
                Some(expired_on) => SkipCause::UnmanagedExpired { expired_on },
                None => SkipCause::Unmanaged,
            };
            decision.skips.push(Skip {
                external_id: roster.external_id.clone(),
                cause,
            });
            return decision;
        }

        // 1. Lock state.
        let target_suspended =
            self.policy
                .target_suspended(roster.account_locked, record, self.today);
        if target_suspended != record.suspended {
            if target_suspended {
                decision.intents.push(Intent::Suspend {
                    external_id: record.external_id.clone(),
                    user_key: record.user_key.clone(),
                });
            } else if record.suspension_reason.is_empty() {
                decision.skips.push(Skip {
                    external_id: record.external_id.clone(),
                    cause: SkipCause::ReactivationBlocked,
                });
            } else {
                decision.intents.push(Intent::Reactivate {
                    external_id: record.external_id.clone(),
                    user_key: record.user_key.clone(),
                });
            }
        }

        // 2. Primary address. Compared case-insensitively: creation lowercases
        // the address, so a mixed-case roster column must still converge.
        if !record
            .primary_address
            .eq_ignore_ascii_case(&roster.sync_email)
        {
            let target = roster.sync_email.to_lowercase();
            if self.apply_email_updates {
                decision.intents.push(Intent::UpdateEmail {
                    external_id: record.external_id.clone(),
                    user_key: record.user_key.clone(),
                    address: target,
                });
            } else {
                decision.skips.push(Skip {
                    external_id: record.external_id.clone(),
                    cause: SkipCause::EmailUpdateSuppressed {
                        current: record.primary_address.clone(),
                        target,
                    },
                });
            }
        }

        // 3. Name fields.
        if record.given_name != roster.given_name || record.family_name != roster.last_name {
            decision.intents.push(Intent::UpdateName {
                external_id: record.external_id.clone(),
                user_key: record.user_key.clone(),
                given_name: roster.given_name.clone(),
                family_name: roster.last_name.clone(),
            });
        }

        // 4. Org-unit placement.
        let target_unit = self.org_units.target_for(roster);
        if !record.org_unit_path.starts_with(target_unit) {
            decision.intents.push(Intent::Move {
                external_id: record.external_id.clone(),
                user_key: record.user_key.clone(),
                org_unit: target_unit.to_string(),
            });
        }

        decision
    }

    /// Pass B verdict for a directory record with no roster counterpart.
    pub fn plan_orphan(&self, record: &DirectoryRecord) -> Decision {
        let mut decision = Decision::default();

        if !record.is_managed() {
            if let Some(expired_on) = record.expire_date.filter(|_| record.is_expired(self.today))
            {
                decision.skips.push(Skip {
                    external_id: record.external_id.clone(),
                    cause: SkipCause::UnmanagedExpired { expired_on },
                });
            }
            return decision;
        }

        if self.policy.deactivation_deferred(record, self.today) {
            decision.skips.push(Skip {
                external_id: record.external_id.clone(),
                cause: SkipCause::GracePeriod {
                    // deactivation_deferred implies a future expire date
                    until: record.expire_date.unwrap_or(self.today),
                },
            });
            return decision;
        }

        if !record.suspended {
            decision.intents.push(Intent::Suspend {
                external_id: record.external_id.clone(),
                user_key: record.user_key.clone(),
            });
        }
        if !record.org_unit_path.starts_with(&self.org_units.disabled) {
            decision.intents.push(Intent::Move {
                external_id: record.external_id.clone(),
                user_key: record.user_key.clone(),
                org_unit: self.org_units.disabled.clone(),
            });
        }

        decision
    }
}
