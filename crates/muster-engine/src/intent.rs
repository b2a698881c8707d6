//! Mutation intents and reasoned skips.

use chrono::NaiveDate;

/// One directory mutation the engine has decided is required.
///
/// `Create` bundles every field of the new account but counts as a single
/// mutation unit against the failsafe. The one-shot password is generated at
/// apply time and never carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create {
        external_id: String,
        primary_address: String,
        given_name: String,
        family_name: String,
        org_unit: String,
        suspended: bool,
    },
    Suspend {
        external_id: String,
        user_key: String,
    },
    Reactivate {
        external_id: String,
        user_key: String,
    },
    UpdateEmail {
        external_id: String,
        user_key: String,
        address: String,
    },
    UpdateName {
        external_id: String,
        user_key: String,
        given_name: String,
        family_name: String,
    },
    Move {
        external_id: String,
        user_key: String,
        org_unit: String,
    },
}

impl Intent {
    /// Operation label used in error records and logs.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Suspend { .. } => "suspend",
            Self::Reactivate { .. } => "reactivate",
            Self::UpdateEmail { .. } => "update-email",
            Self::UpdateName { .. } => "update-name",
            Self::Move { .. } => "move",
        }
    }

    pub fn external_id(&self) -> &str {
        match self {
            Self::Create { external_id, .. }
            | Self::Suspend { external_id, .. }
            | Self::Reactivate { external_id, .. }
            | Self::UpdateEmail { external_id, .. }
            | Self::UpdateName { external_id, .. }
            | Self::Move { external_id, .. } => external_id,
        }
    }
}

/// Why the engine deliberately did not mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipCause {
    /// The authoritative address has no `@`; creation is not attempted.
    /// Recorded as a run error.
    InvalidEmail { address: String },
    /// The account is suspended without a reason; the suspension may be a
    /// security action outside this system, so reactivation is withheld.
    ReactivationBlocked,
    /// `workdayManaged` is explicitly false.
    Unmanaged,
    /// Unmanaged and past its expire date; surfaced for the operator but
    /// never mutated.
    UnmanagedExpired { expired_on: NaiveDate },
    /// Orphaned record with a future expire date; left alone this run.
    GracePeriod { until: NaiveDate },
    /// The primary address drifted but email updates are disabled.
    EmailUpdateSuppressed { current: String, target: String },
}

impl SkipCause {
    /// Skips that count against the run's pass/fail status.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::InvalidEmail { .. })
    }
}

impl std::fmt::Display for SkipCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail { address } => {
                write!(f, "cannot create account, invalid address {address:?}")
            }
            Self::ReactivationBlocked => {
                write!(f, "reactivation withheld, suspension reason is empty")
            }
            Self::Unmanaged => write!(f, "account is not workday-managed"),
            Self::UnmanagedExpired { expired_on } => {
                write!(f, "unmanaged account expired on {expired_on}")
            }
            Self::GracePeriod { until } => write!(f, "in grace period until {until}"),
            Self::EmailUpdateSuppressed { current, target } => {
                write!(f, "address drift {current} -> {target}, email updates disabled")
            }
        }
    }
}

/// A reasoned skip attached to a specific user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub external_id: String,
    pub cause: SkipCause,
}

/// The engine's verdict for one user: required mutations plus everything it
/// deliberately chose not to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decision {
    pub intents: Vec<Intent>,
    pub skips: Vec<Skip>,
}

impl Decision {
    pub fn is_noop(&self) -> bool {
        self.intents.is_empty() && self.skips.is_empty()
    }
}
