//! Client error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Only `Unauthorized` has a systemic effect (the session is torn down before
//! it is returned). A rejected login is `InvalidCredentials` and leaves the
//! session alone. Everything else is terminal for the call that raised it;
//! nothing here is retried automatically.

use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No credentials are stored for an endpoint that needs them.
    #[error("not logged in")]
    NotLoggedIn,
    /// The server rejected the session; it has already been cleared.
    #[error("session rejected by server (401)")]
    Unauthorized,
    /// A segment failed structural validation and was not submitted.
    #[error("invalid segment: {0}")]
    Validation(#[from] segments::ValidationError),
    /// A segment's subset value is out of range and was not submitted.
    #[error("invalid subset: {0}")]
    InvalidSubset(#[from] segments::SegmentError),
    /// The login endpoint rejected the username or password.
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    /// Non-2xx response other than 401.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),
    /// A capped poll ran out of attempts before its condition held.
    #[error("gave up waiting after {attempts} attempts")]
    TimedOut { attempts: u32 },
    /// A background poll was aborted before it finished.
    #[error("poll cancelled")]
    Cancelled,
}

impl ClientError {
    /// Short user-facing message for transient notifications.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Unauthorized | Self::NotLoggedIn => "Your session has ended. Please log in again.".to_owned(),
            Self::InvalidCredentials => "Incorrect username or password.".to_owned(),
            Self::Validation(err) => format!("Please complete the form: {err}"),
            Self::InvalidSubset(err) => format!("Please fix the subset: {err}"),
            Self::TimedOut { .. } => "This is taking longer than expected. Check back later.".to_owned(),
            Self::Status { status, .. } if *status >= 500 => "The server had a problem. Please try again.".to_owned(),
            other => other.to_string(),
        }
    }
}
