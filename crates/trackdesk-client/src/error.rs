use std::time::Duration;

use thiserror::Error;
use trackdesk_core::CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// 401/403 from the backend. The session has already been cleared.
    #[error("session expired or access denied ({status}): {message}")]
    AuthExpired { status: u16, message: String },

    /// No token in the session; nothing was sent.
    #[error("not signed in")]
    NotAuthenticated,

    /// The backend refused a password the operator typed. The session is untouched.
    #[error("credentials rejected: {0}")]
    LoginFailed(String),

    #[error("response decode error: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("session error: {0}")]
    Session(#[from] CoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Whether the caller has to sign in again before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::AuthExpired { .. } | ApiError::NotAuthenticated)
    }

    /// Human-facing detail, verbatim from the backend when it sent one.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Server { message, .. } | ApiError::AuthExpired { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}
