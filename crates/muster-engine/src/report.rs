//! Run-wide accumulation state and the final report.

use std::time::Duration;

use tracing::{error, info};
use uuid::Uuid;

use crate::apply::ApplyMode;
use crate::intent::Intent;

/// A failed or refused mutation, kept for the final report.
#[derive(Debug, Clone)]
pub struct MutationError {
    pub external_id: String,
    pub operation: String,
    pub message: String,
}

impl std::fmt::Display for MutationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.operation, self.external_id, self.message)
    }
}

/// Mutable state threaded through a run: the failsafe counter, per-intent
/// counters, and the error list. No globals.
#[derive(Debug, Default)]
pub struct RunState {
    /// Total mutations applied (or rehearsed in dry-run); the failsafe cap
    /// is checked against this after every single mutation.
    pub mutations: u64,
    pub created: u64,
    pub suspended: u64,
    pub reactivated: u64,
    pub readdressed: u64,
    pub renamed: u64,
    pub moved: u64,
    pub errors: Vec<MutationError>,
}

impl RunState {
    pub fn record_success(&mut self, intent: &Intent) {
        self.mutations += 1;
        match intent {
            Intent::Create { .. } => self.created += 1,
            Intent::Suspend { .. } => self.suspended += 1,
            Intent::Reactivate { .. } => self.reactivated += 1,
            Intent::UpdateEmail { .. } => self.readdressed += 1,
            Intent::UpdateName { .. } => self.renamed += 1,
            Intent::Move { .. } => self.moved += 1,
        }
    }

    pub fn record_error(&mut self, intent: &Intent, message: String) {
        self.errors.push(MutationError {
            external_id: intent.external_id().to_string(),
            operation: intent.operation().to_string(),
            message,
        });
    }
}

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

/// Everything the operator sees at the end of a run.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub mode: ApplyMode,
    pub state: RunState,
    pub roster_size: usize,
    pub directory_size: usize,
    pub skipped_entries: usize,
    pub failsafe_tripped: bool,
    /// Set when a fetch precondition aborted the run before reconciliation.
    pub fatal: Option<String>,
    pub elapsed: Duration,
}

impl RunReport {
    /// The only machine-consumable signal: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Success => 0,
            RunStatus::Failure => 1,
        }
    }

    /// One summary block at the end of every run, success or failure.
    pub fn log_summary(&self) {
        if let Some(fatal) = &self.fatal {
            error!(run_id = %self.run_id, "run aborted: {fatal}");
        }
        for err in &self.state.errors {
            error!(run_id = %self.run_id, "mutation error: {err}");
        }
        if self.failsafe_tripped {
            error!(
                run_id = %self.run_id,
                mutations = self.state.mutations,
                "failsafe change limit exceeded, run terminated early"
            );
        }
        info!(
            run_id = %self.run_id,
            status = ?self.status,
            mode = ?self.mode,
            roster = self.roster_size,
            directory = self.directory_size,
            skipped = self.skipped_entries,
            mutations = self.state.mutations,
            created = self.state.created,
            suspended = self.state.suspended,
            reactivated = self.state.reactivated,
            readdressed = self.state.readdressed,
            renamed = self.state.renamed,
            moved = self.state.moved,
            errors = self.state.errors.len(),
            elapsed_ms = self.elapsed.as_millis() as u64,
            "reconciliation run finished"
        );
    }
}
