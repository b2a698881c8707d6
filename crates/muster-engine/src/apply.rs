//! Executes intents against the directory store.

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{info, warn};

use muster_directory::{DirectoryStore, ExternalId, NewUser, UserName};

use crate::intent::Intent;
use crate::report::RunState;

/// Whether mutations are sent to the directory or only rehearsed.
///
/// Dry-run logs every intent and still increments the mutation counter, so
/// the failsafe and the final report behave identically in both modes; only
/// the remote writes are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    Apply,
    DryRun,
}

/// Bytes of entropy in a one-shot creation password.
const PASSWORD_BYTES: usize = 18;

/// Generates the single-use password set on account creation. It is handed
/// to the directory and immediately forgotten, never logged or persisted;
/// the account owner goes through recovery to take possession.
fn generate_password() -> String {
    let mut bytes = [0u8; PASSWORD_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Applies intents one at a time, recording successes and failures into the
/// run state. A failed mutation never stops the run; it is recorded and the
/// next intent proceeds.
pub struct Applier<'a> {
    store: &'a dyn DirectoryStore,
    mode: ApplyMode,
}

impl<'a> Applier<'a> {
    pub fn new(store: &'a dyn DirectoryStore, mode: ApplyMode) -> Self {
        Self { store, mode }
    }

    /// Executes one intent. Returns true when the mutation counted (applied,
    /// or rehearsed in dry-run), false when it failed.
    pub async fn apply(&self, intent: &Intent, state: &mut RunState) -> bool {
        if self.mode == ApplyMode::DryRun {
            info!(
                external_id = %intent.external_id(),
                operation = intent.operation(),
                "dry-run: mutation computed but not applied"
            );
            state.record_success(intent);
            return true;
        }

        let result = match intent {
            Intent::Create {
                external_id,
                primary_address,
                given_name,
                family_name,
                org_unit,
                suspended,
            } => self
                .store
                .insert_user(NewUser {
                    primary_email: primary_address.clone(),
                    name: UserName {
                        given_name: given_name.clone(),
                        family_name: family_name.clone(),
                        full_name: format!("{given_name} {family_name}"),
                    },
                    org_unit_path: org_unit.clone(),
                    suspended: *suspended,
                    external_ids: vec![ExternalId {
                        kind: "organization".into(),
                        value: external_id.clone(),
                    }],
                    password: generate_password(),
                    include_in_global_address_list: false,
                })
                .await
                .map(|_| ()),
            Intent::Suspend { user_key, .. } => self.store.set_suspended(user_key, true).await,
            Intent::Reactivate { user_key, .. } => self.store.set_suspended(user_key, false).await,
            Intent::UpdateEmail {
                user_key, address, ..
            } => self.store.set_primary_address(user_key, address).await,
            Intent::UpdateName {
                user_key,
                given_name,
                family_name,
                ..
            } => self.store.set_name(user_key, given_name, family_name).await,
            Intent::Move {
                user_key, org_unit, ..
            } => self.store.set_org_unit(user_key, org_unit).await,
        };

        match result {
            Ok(()) => {
                info!(
                    external_id = %intent.external_id(),
                    operation = intent.operation(),
                    "mutation applied"
                );
                state.record_success(intent);
                true
            }
            Err(e) => {
                warn!(
                    external_id = %intent.external_id(),
                    operation = intent.operation(),
                    error = %e,
                    "mutation failed, continuing with remaining work"
                );
                state.record_error(intent, e.to_string());
                false
            }
        }
    }
}
