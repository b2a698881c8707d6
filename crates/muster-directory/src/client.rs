//! HTTP implementation of [`DirectoryStore`] with pagination and retry.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::DirectoryError;
use crate::store::DirectoryStore;
use crate::types::{DirectoryUser, NewUser, UserName, UserPatch};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_RETRIES: u32 = 5;
const PAGE_SIZE: usize = 500;

/// Cap on the total number of users fetched during a listing. Reconciling
/// against a silently truncated view would deactivate every user past the
/// truncation point, so exceeding the cap is an error, not a partial result.
const MAX_DIRECTORY_USERS: usize = 50_000;

/// Structured error body from the directory API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Paginated listing envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserListPage {
    #[serde(default)]
    users: Vec<DirectoryUser>,
    next_page_token: Option<String>,
}

/// Bearer-token HTTP client for the directory API.
pub struct DirectoryClient {
    http: reqwest::Client,
    base_uri: String,
    token: String,
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("base_uri", &self.base_uri)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl DirectoryClient {
    pub fn new(base_uri: impl Into<String>, token: impl Into<String>) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(DirectoryError::Client)?;
        let mut base_uri = base_uri.into();
        while base_uri.ends_with('/') {
            base_uri.pop();
        }
        Ok(Self {
            http,
            base_uri,
            token: token.into(),
        })
    }

    /// Lightweight connectivity and credential check: fetches a single user.
    pub async fn test_connection(&self) -> Result<(), DirectoryError> {
        let url = format!("{}/users?maxResults=1", self.base_uri);
        let _: UserListPage = self.request(reqwest::Method::GET, &url, None::<&()>).await?;
        Ok(())
    }

    /// One request with bearer auth; transient failures retry with
    /// exponential backoff up to `MAX_RETRIES`.
    async fn request<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, DirectoryError> {
        let mut retries = 0;
        let mut delay = Duration::from_secs(1);

        loop {
            let mut request = self
                .http
                .request(method.clone(), url)
                .bearer_auth(&self.token);
            if let Some(b) = body {
                request = request.json(b);
            }

            let response = request.send().await?;
            let status = response.status();

            if status.is_success() {
                return response.json().await.map_err(DirectoryError::Decode);
            }

            let body_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body_text)
                .map(|b| b.error.message)
                .unwrap_or(body_text);
            let err = DirectoryError::Api {
                status: status.as_u16(),
                message,
            };

            if err.is_transient() && retries < MAX_RETRIES {
                retries += 1;
                warn!(
                    status = status.as_u16(),
                    retry = retries,
                    max = MAX_RETRIES,
                    delay_secs = delay.as_secs(),
                    "transient directory error, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            return Err(err);
        }
    }

    async fn patch_user(&self, user_key: &str, patch: &UserPatch) -> Result<(), DirectoryError> {
        let url = format!("{}/users/{}", self.base_uri, user_key);
        let _: DirectoryUser = self.request(reqwest::Method::PATCH, &url, Some(patch)).await?;
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for DirectoryClient {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        let mut all = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}/users?maxResults={}", self.base_uri, PAGE_SIZE);
            if let Some(token) = &page_token {
                url.push_str("&pageToken=");
                url.push_str(token);
            }

            debug!(fetched = all.len(), "fetching directory page");
            let page: UserListPage = self.request(reqwest::Method::GET, &url, None::<&()>).await?;
            all.extend(page.users);

            if all.len() > MAX_DIRECTORY_USERS {
                return Err(DirectoryError::ListingTruncated {
                    cap: MAX_DIRECTORY_USERS,
                });
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = all.len(), "directory listing complete");
        Ok(all)
    }

    async fn insert_user(&self, user: NewUser) -> Result<DirectoryUser, DirectoryError> {
        let url = format!("{}/users", self.base_uri);
        self.request(reqwest::Method::POST, &url, Some(&user)).await
    }

    async fn set_suspended(&self, user_key: &str, suspended: bool) -> Result<(), DirectoryError> {
        self.patch_user(
            user_key,
            &UserPatch {
                suspended: Some(suspended),
                ..Default::default()
            },
        )
        .await
    }

    async fn set_primary_address(
        &self,
        user_key: &str,
        address: &str,
    ) -> Result<(), DirectoryError> {
        self.patch_user(
            user_key,
            &UserPatch {
                primary_email: Some(address.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    async fn set_name(
        &self,
        user_key: &str,
        given_name: &str,
        family_name: &str,
    ) -> Result<(), DirectoryError> {
        self.patch_user(
            user_key,
            &UserPatch {
                name: Some(UserName {
                    given_name: given_name.to_string(),
                    family_name: family_name.to_string(),
                    full_name: format!("{given_name} {family_name}"),
                }),
                ..Default::default()
            },
        )
        .await
    }

    async fn set_org_unit(&self, user_key: &str, path: &str) -> Result<(), DirectoryError> {
        self.patch_user(
            user_key,
            &UserPatch {
                org_unit_path: Some(path.to_string()),
                ..Default::default()
            },
        )
        .await
    }
}
