//! Wire types for the HR report document and the adapter that maps report
//! columns onto the internal roster shape.

use std::collections::HashMap;

use serde::Deserialize;

use muster_core::RawRosterEntry;

/// Top-level report document: `{"Report_Entry": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportDocument {
    #[serde(rename = "Report_Entry", default)]
    pub entries: Vec<ReportEntry>,
}

/// One row of the report.
///
/// The stable columns have named fields; everything else lands in `extra` so
/// the adapter can pull the configured authoritative email column without a
/// schema change when the report revision renames it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportEntry {
    #[serde(rename = "Employee_ID")]
    pub external_id: Option<String>,
    #[serde(rename = "User_Name")]
    pub user_name: Option<String>,
    #[serde(rename = "Display_Name")]
    pub display_name: Option<String>,
    #[serde(rename = "Email_Address")]
    pub email: Option<String>,
    #[serde(rename = "Account_Locked")]
    pub account_locked: Option<String>,
    #[serde(rename = "First_Name")]
    pub given_name: Option<String>,
    #[serde(rename = "Last_Name")]
    pub last_name: Option<String>,
    #[serde(rename = "Org_Assignment")]
    pub org_assigned: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ReportEntry {
    /// Looks a column up by name, covering both the named fields and the
    /// flattened remainder. Numeric values are stringified so flag columns
    /// that flip between `"1"` and `1` across revisions compare the same.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "Employee_ID" => self.external_id.clone(),
            "User_Name" => self.user_name.clone(),
            "Display_Name" => self.display_name.clone(),
            "Email_Address" => self.email.clone(),
            "Account_Locked" => self.account_locked.clone(),
            "First_Name" => self.given_name.clone(),
            "Last_Name" => self.last_name.clone(),
            "Org_Assignment" => self.org_assigned.as_ref().map(value_to_string),
            _ => self.extra.get(name).map(value_to_string),
        }
    }
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Maps report rows onto [`RawRosterEntry`].
///
/// The authoritative email column is the one field whose name genuinely moves
/// between report revisions, so it is a constructor parameter rather than a
/// serde rename.
#[derive(Debug, Clone)]
pub struct ReportAdapter {
    email_field: String,
}

impl ReportAdapter {
    pub fn new(email_field: impl Into<String>) -> Self {
        Self {
            email_field: email_field.into(),
        }
    }

    pub fn adapt(&self, entry: &ReportEntry) -> RawRosterEntry {
        RawRosterEntry {
            external_id: entry.external_id.clone(),
            user_name: entry.user_name.clone(),
            display_name: entry.display_name.clone(),
            email: entry.email.clone(),
            sync_email: entry.field(&self.email_field),
            account_locked: entry.account_locked.clone(),
            given_name: entry.given_name.clone(),
            last_name: entry.last_name.clone(),
            org_assigned: entry.org_assigned.as_ref().map(value_to_string),
        }
    }

    pub fn adapt_all(&self, entries: &[ReportEntry]) -> Vec<RawRosterEntry> {
        entries.iter().map(|e| self.adapt(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_entry() -> ReportEntry {
        serde_json::from_value(json!({
            "Employee_ID": "1001",
            "User_Name": "alovelace",
            "Display_Name": "Ada Lovelace",
            "Email_Address": "ada.lovelace@corp.example.org",
            "Sync_Email": "Ada.Lovelace@example.org",
            "Account_Locked": "False",
            "First_Name": "Ada",
            "Last_Name": "Lovelace",
            "Org_Assignment": 1
        }))
        .unwrap()
    }

    #[test]
    fn document_parses_report_entry_array() {
        let doc: ReportDocument = serde_json::from_value(json!({
            "Report_Entry": [{"Employee_ID": "1001", "User_Name": "alovelace"}]
        }))
        .unwrap();
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].external_id.as_deref(), Some("1001"));
    }

    #[test]
    fn adapter_pulls_configured_email_column() {
        let adapter = ReportAdapter::new("Sync_Email");
        let raw = adapter.adapt(&sample_entry());
        assert_eq!(raw.sync_email.as_deref(), Some("Ada.Lovelace@example.org"));
        assert_eq!(raw.email.as_deref(), Some("ada.lovelace@corp.example.org"));
    }

    #[test]
    fn adapter_can_reuse_a_named_column() {
        let adapter = ReportAdapter::new("Email_Address");
        let raw = adapter.adapt(&sample_entry());
        assert_eq!(raw.sync_email.as_deref(), Some("ada.lovelace@corp.example.org"));
    }

    #[test]
    fn numeric_org_flag_is_stringified() {
        let adapter = ReportAdapter::new("Sync_Email");
        let raw = adapter.adapt(&sample_entry());
        assert_eq!(raw.org_assigned.as_deref(), Some("1"));
    }

    #[test]
    fn missing_email_column_yields_none() {
        let adapter = ReportAdapter::new("No_Such_Column");
        let raw = adapter.adapt(&sample_entry());
        assert!(raw.sync_email.is_none());
    }
}
