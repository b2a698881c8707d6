//! The run controller: drives a whole reconciliation pass under the failsafe.

use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use muster_core::{normalize::normalize_roster, DirectoryIndex, RawRosterEntry, SuspensionPolicy};
use muster_directory::{normalize_directory, DirectoryStore};

use crate::apply::{Applier, ApplyMode};
use crate::decision::{Decider, OrgUnits};
use crate::intent::{Decision, Intent};
use crate::planner::Planner;
use crate::report::{MutationError, RunReport, RunState, RunStatus};

/// Per-run configuration, decided once before the run starts.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Hard cap on mutations per run. The run aborts the instant the counter
    /// exceeds this value.
    pub failsafe_change_limit: u64,
    /// Minimum roster size for the run to proceed at all, and for the
    /// deactivation pass to run. Protects against a truncated or empty
    /// upstream fetch silently wiping the directory.
    pub min_safe_user_count: usize,
    pub org_units: OrgUnits,
    pub apply_email_updates: bool,
    pub mode: ApplyMode,
}

/// Drives one reconciliation pass: precondition checks, directory fetch,
/// Pass A (roster-driven), Pass B (deactivation), final report.
pub struct RunController {
    settings: RunSettings,
    policy: Box<dyn SuspensionPolicy>,
}

impl RunController {
    pub fn new(settings: RunSettings, policy: Box<dyn SuspensionPolicy>) -> Self {
        Self { settings, policy }
    }

    pub async fn run(
        &self,
        raw_roster: Vec<RawRosterEntry>,
        store: &dyn DirectoryStore,
    ) -> RunReport {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, mode = ?self.settings.mode, "reconciliation run starting");

        // Fetch precondition: refuse to act on a suspiciously small roster.
        if raw_roster.len() < self.settings.min_safe_user_count {
            return self.fatal_report(
                run_id,
                started,
                format!(
                    "roster has {} entries, below the safe minimum of {}",
                    raw_roster.len(),
                    self.settings.min_safe_user_count
                ),
            );
        }

        let roster = normalize_roster(raw_roster);
        let skipped_entries = roster.skipped.len();
        info!(
            run_id = %run_id,
            valid = roster.len(),
            skipped = skipped_entries,
            "roster working set built"
        );

        let directory_users = match store.list_users().await {
            Ok(users) => users,
            Err(e) => {
                return self.fatal_report(run_id, started, format!("directory fetch failed: {e}"))
            }
        };
        let index = DirectoryIndex::build(normalize_directory(directory_users));
        info!(run_id = %run_id, directory = index.len(), "directory working set built");

        let roster_size = roster.len();
        let mut planner = Planner::new(roster.records, index);
        let directory_size = planner.directory_len();
        let applier = Applier::new(store, self.settings.mode);
        let decider = self.decider();
        let mut state = RunState::default();
        let mut failsafe_tripped = false;

        // Pass A: roster-driven create/update.
        'pass_a: for external_id in planner.roster_ids() {
            let Some(decision) = planner.plan_roster_user(&external_id, &decider) else {
                continue;
            };

            self.record_skips(&decision, &mut state);
            for intent in &decision.intents {
                let applied = applier.apply(intent, &mut state).await;
                if applied {
                    if let Intent::UpdateName {
                        external_id,
                        given_name,
                        family_name,
                        ..
                    } = intent
                    {
                        planner.commit_name_update(external_id, given_name, family_name);
                    }
                }
                if state.mutations > self.settings.failsafe_change_limit {
                    failsafe_tripped = true;
                    break 'pass_a;
                }
            }
        }

        // Pass B: deactivate directory-only records, gated on a sane roster.
        if !failsafe_tripped {
            if planner.roster_len() > self.settings.min_safe_user_count {
                'pass_b: for external_id in planner.orphan_ids() {
                    let Some(decision) = planner.plan_orphan(&external_id, &decider) else {
                        continue;
                    };

                    self.record_skips(&decision, &mut state);
                    for intent in &decision.intents {
                        applier.apply(intent, &mut state).await;
                        if state.mutations > self.settings.failsafe_change_limit {
                            failsafe_tripped = true;
                            break 'pass_b;
                        }
                    }
                }
            } else {
                warn!(
                    run_id = %run_id,
                    roster = planner.roster_len(),
                    min = self.settings.min_safe_user_count,
                    "deactivation pass skipped, roster working set is not above the safe minimum"
                );
            }
        }

        let status = if failsafe_tripped || !state.errors.is_empty() {
            RunStatus::Failure
        } else {
            RunStatus::Success
        };

        RunReport {
            run_id,
            status,
            mode: self.settings.mode,
            state,
            roster_size,
            directory_size,
            skipped_entries,
            failsafe_tripped,
            fatal: None,
            elapsed: started.elapsed(),
        }
    }

    fn decider(&self) -> Decider<'_> {
        Decider {
            policy: self.policy.as_ref(),
            org_units: &self.settings.org_units,
            apply_email_updates: self.settings.apply_email_updates,
            today: Utc::now().date_naive(),
        }
    }

    /// Logs each reasoned skip; error-class skips join the run's error list.
    fn record_skips(&self, decision: &Decision, state: &mut RunState) {
        for skip in &decision.skips {
            if skip.cause.is_error() {
                warn!(external_id = %skip.external_id, "{}", skip.cause);
                state.errors.push(MutationError {
                    external_id: skip.external_id.clone(),
                    operation: "create".into(),
                    message: skip.cause.to_string(),
                });
            } else {
                info!(external_id = %skip.external_id, "skipped: {}", skip.cause);
            }
        }
    }

    fn fatal_report(&self, run_id: Uuid, started: Instant, reason: String) -> RunReport {
        RunReport {
            run_id,
            status: RunStatus::Failure,
            mode: self.settings.mode,
            state: RunState::default(),
            roster_size: 0,
            directory_size: 0,
            skipped_entries: 0,
            failsafe_tripped: false,
            fatal: Some(reason),
            elapsed: started.elapsed(),
        }
    }
}
