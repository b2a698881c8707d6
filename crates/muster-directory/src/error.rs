//! Directory service error types with transient/permanent classification.

use thiserror::Error;

/// Error from a directory query or mutation.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a structured error body.
    #[error("directory API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("directory response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("directory user not found: {user_key}")]
    NotFound { user_key: String },

    /// The paginated listing exceeded the safety cap before completing.
    #[error("directory listing exceeded {cap} users, refusing to reconcile a truncated view")]
    ListingTruncated { cap: usize },
}

impl DirectoryError {
    /// Whether retrying the same request could plausibly succeed. The HTTP
    /// client consults this when a response status comes back non-success;
    /// the reconciliation layer never retries a failed mutation.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification_follows_status() {
        let rate_limited = DirectoryError::Api {
            status: 429,
            message: String::new(),
        };
        let gateway = DirectoryError::Api {
            status: 502,
            message: String::new(),
        };
        let forbidden = DirectoryError::Api {
            status: 403,
            message: "insufficient scope".into(),
        };
        assert!(rate_limited.is_transient());
        assert!(gateway.is_transient());
        assert!(!forbidden.is_transient());
        assert!(!DirectoryError::NotFound {
            user_key: "k".into()
        }
        .is_transient());
    }
}
