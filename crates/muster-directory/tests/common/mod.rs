//! JSON factories shared by the directory client tests.

use serde_json::{json, Value};

pub fn user_json(key: &str, external_id: &str, email: &str) -> Value {
    json!({
        "id": key,
        "primaryEmail": email,
        "name": {"givenName": "Ada", "familyName": "Lovelace", "fullName": "Ada Lovelace"},
        "suspended": false,
        "orgUnitPath": "/staff",
        "externalIds": [{"type": "organization", "value": external_id}]
    })
}

pub fn page_json(users: Vec<Value>, next_page_token: Option<&str>) -> Value {
    let mut page = json!({"users": users});
    if let Some(token) = next_page_token {
        page["nextPageToken"] = json!(token);
    }
    page
}
