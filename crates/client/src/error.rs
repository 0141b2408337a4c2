use reqwest::StatusCode;
use thiserror::Error;

use easyway_auth::AuthError;
use easyway_core::DomainError;

/// No response was received (connect, DNS, timeout).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Surfaced verbatim; never triggers a refresh.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A request that was already replayed after a refresh got 401 again.
    #[error("request rejected with 401 after token refresh")]
    Unauthorized,

    /// Refresh impossible or failed; the session has been terminated.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// Another session signed in while this request waited on a refresh.
    /// The request is not replayed with the new session's credentials.
    #[error("session changed during token refresh")]
    SessionChanged,

    /// The task driving the refresh went away before it finished.
    #[error("token refresh was aborted")]
    RefreshAborted,

    /// Non-success status with a user-facing message.
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// Whether the user has to sign in again.
    pub fn is_session_lost(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::SessionExpired(_) | Self::RefreshAborted
        )
    }
}
