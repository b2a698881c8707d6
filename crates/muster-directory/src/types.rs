//! Wire types for the directory API and conversion into the internal record
//! shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use muster_core::DirectoryRecord;

/// External-identifier list entry type that carries the roster join key.
pub const ORGANIZATION_ID_TYPE: &str = "organization";

/// Name block of a directory user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub full_name: String,
}

/// One entry of a user's external-identifier list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalId {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

/// The custom-attribute block reconciliation reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAttributes {
    /// Tri-state managed flag: absent or true means managed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workday_managed: Option<bool>,
    /// `yyyy-MM-dd`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_expire_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_active_until_expire: Option<bool>,
}

/// Custom-schema envelope; only the sync block is projected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomSchemas {
    #[serde(default)]
    pub sync: SyncAttributes,
}

/// A directory user as returned by the query API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    /// Opaque key used to address the user for mutation.
    pub id: String,
    #[serde(default)]
    pub primary_email: String,
    #[serde(default)]
    pub name: UserName,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspension_reason: Option<String>,
    #[serde(default)]
    pub org_unit_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ids: Option<Vec<ExternalId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_schemas: Option<CustomSchemas>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_time: Option<DateTime<Utc>>,
}

impl DirectoryUser {
    /// The `organization`-typed external identifier, if present and non-empty.
    pub fn organization_id(&self) -> Option<&str> {
        self.external_ids
            .as_deref()?
            .iter()
            .find(|e| e.kind == ORGANIZATION_ID_TYPE && !e.value.is_empty())
            .map(|e| e.value.as_str())
    }

    /// Reduces the wire shape to the internal record. Users without an
    /// organization external id are invisible to reconciliation and yield
    /// `None`; an unparseable expire date is treated as unset with a warning.
    pub fn into_record(self) -> Option<DirectoryRecord> {
        let external_id = self.organization_id()?.to_string();
        let sync = self.custom_schemas.map(|c| c.sync).unwrap_or_default();

        let expire_date = sync.account_expire_date.as_deref().and_then(|raw| {
            match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    warn!(user_key = %self.id, raw = %raw, "unparseable accountExpireDate, ignoring");
                    None
                }
            }
        });

        Some(DirectoryRecord {
            external_id,
            user_key: self.id,
            suspended: self.suspended,
            suspension_reason: self.suspension_reason.unwrap_or_default(),
            primary_address: self.primary_email,
            given_name: self.name.given_name,
            family_name: self.name.family_name,
            full_name: self.name.full_name,
            org_unit_path: self.org_unit_path,
            managed: sync.workday_managed,
            expire_date,
            force_active_until_expire: sync.force_active_until_expire.unwrap_or(false),
            last_login: self.last_login_time,
        })
    }
}

/// Converts the directory listing into internal records, silently dropping
/// users without an organization external id.
pub fn normalize_directory(users: Vec<DirectoryUser>) -> Vec<DirectoryRecord> {
    users.into_iter().filter_map(DirectoryUser::into_record).collect()
}

/// Payload for account creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub primary_email: String,
    pub name: UserName,
    pub org_unit_path: String,
    pub suspended: bool,
    pub external_ids: Vec<ExternalId>,
    pub password: String,
    pub include_in_global_address_list: bool,
}

/// Sparse update payload; unset fields are left untouched by the API.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<UserName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_unit_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_json() -> serde_json::Value {
        json!({
            "id": "dir-key-1",
            "primaryEmail": "ada.lovelace@example.org",
            "name": {"givenName": "Ada", "familyName": "Lovelace", "fullName": "Ada Lovelace"},
            "suspended": false,
            "orgUnitPath": "/staff/assigned",
            "externalIds": [
                {"type": "account", "value": "ignored"},
                {"type": "organization", "value": "1001"}
            ],
            "customSchemas": {
                "sync": {
                    "workdayManaged": true,
                    "accountExpireDate": "2026-12-31",
                    "forceActiveUntilExpire": true
                }
            },
            "lastLoginTime": "2026-08-01T10:00:00Z"
        })
    }

    #[test]
    fn record_conversion_reads_organization_id_and_custom_attributes() {
        let user: DirectoryUser = serde_json::from_value(user_json()).unwrap();
        let record = user.into_record().unwrap();
        assert_eq!(record.external_id, "1001");
        assert_eq!(record.user_key, "dir-key-1");
        assert_eq!(record.expire_date, Some("2026-12-31".parse().unwrap()));
        assert!(record.force_active_until_expire);
        assert_eq!(record.managed, Some(true));
    }

    #[test]
    fn user_without_organization_id_is_dropped() {
        let mut value = user_json();
        value["externalIds"] = json!([{"type": "account", "value": "x"}]);
        let user: DirectoryUser = serde_json::from_value(value).unwrap();
        assert!(user.into_record().is_none());

        let mut value = user_json();
        value["externalIds"] = json!([{"type": "organization", "value": ""}]);
        let user: DirectoryUser = serde_json::from_value(value).unwrap();
        assert!(user.into_record().is_none());
    }

    #[test]
    fn missing_custom_schemas_default_to_managed() {
        let mut value = user_json();
        value.as_object_mut().unwrap().remove("customSchemas");
        let user: DirectoryUser = serde_json::from_value(value).unwrap();
        let record = user.into_record().unwrap();
        assert_eq!(record.managed, None);
        assert!(record.expire_date.is_none());
        assert!(!record.force_active_until_expire);
    }

    #[test]
    fn bad_expire_date_is_ignored() {
        let mut value = user_json();
        value["customSchemas"]["sync"]["accountExpireDate"] = json!("31/12/2026");
        let user: DirectoryUser = serde_json::from_value(value).unwrap();
        assert!(user.into_record().unwrap().expire_date.is_none());
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = UserPatch {
            suspended: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"suspended": true})
        );
    }
}
