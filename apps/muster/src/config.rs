//! Environment configuration with fail-fast validation.

use std::env;

use thiserror::Error;

use muster_engine::OrgUnits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Everything a run needs, resolved once at startup.
///
/// CLI flags may override individual fields after loading; validation happens
/// here so a bad environment fails before any network call.
pub struct Config {
    pub roster_uri: String,
    pub roster_user: String,
    pub roster_password: String,
    pub directory_base_uri: String,
    pub directory_token: String,
    pub change_limit: u64,
    pub min_safe_users: usize,
    pub org_units: OrgUnits,
    /// Roster column holding the authoritative login address.
    pub email_field: String,
    /// Apply mutations; false means dry-run.
    pub apply: bool,
    pub apply_email_updates: bool,
    /// Honor accountExpireDate/forceActiveUntilExpire grace semantics.
    pub honor_expiry: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("roster_uri", &self.roster_uri)
            .field("roster_user", &self.roster_user)
            .field("roster_password", &"<redacted>")
            .field("directory_base_uri", &self.directory_base_uri)
            .field("directory_token", &"<redacted>")
            .field("change_limit", &self.change_limit)
            .field("min_safe_users", &self.min_safe_users)
            .field("email_field", &self.email_field)
            .field("apply", &self.apply)
            .field("apply_email_updates", &self.apply_email_updates)
            .field("honor_expiry", &self.honor_expiry)
            .finish()
    }
}

fn required(var: &str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::MissingVar(var.to_string()))
}

fn optional_parsed<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: var.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn optional_bool(var: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(var) {
        Ok(raw) => match raw.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(ConfigError::InvalidValue {
                var: var.to_string(),
                message: format!("expected true/false, got {other:?}"),
            }),
        },
        Err(_) => Ok(default),
    }
}

fn org_unit(var: &str, default: &str) -> Result<String, ConfigError> {
    let path = env::var(var).unwrap_or_else(|_| default.to_string());
    if !path.starts_with('/') {
        return Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: format!("org unit path must start with '/', got {path:?}"),
        });
    }
    Ok(path)
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            roster_uri: required("MUSTER_ROSTER_URI")?,
            roster_user: required("MUSTER_ROSTER_USER")?,
            roster_password: required("MUSTER_ROSTER_PASSWORD")?,
            directory_base_uri: required("MUSTER_DIRECTORY_BASE_URI")?,
            directory_token: required("MUSTER_DIRECTORY_TOKEN")?,
            change_limit: optional_parsed("MUSTER_CHANGE_LIMIT", 50)?,
            min_safe_users: optional_parsed("MUSTER_MIN_SAFE_USERS", 100)?,
            org_units: OrgUnits {
                assigned: org_unit("MUSTER_ASSIGNED_ORG_UNIT", "/staff/assigned")?,
                default_unit: org_unit("MUSTER_DEFAULT_ORG_UNIT", "/staff")?,
                disabled: org_unit("MUSTER_DISABLED_ORG_UNIT", "/disabled")?,
            },
            email_field: env::var("MUSTER_EMAIL_FIELD")
                .unwrap_or_else(|_| "Sync_Email".to_string()),
            apply: optional_bool("MUSTER_APPLY", false)?,
            apply_email_updates: optional_bool("MUSTER_APPLY_EMAIL_UPDATES", false)?,
            honor_expiry: optional_bool("MUSTER_HONOR_EXPIRY", true)?,
        })
    }
}
