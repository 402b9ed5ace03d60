use std::fmt;

use thiserror::Error;
use trackdesk_client::ApiError;

/// Operator-triggered actions that can fail or be declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Deliver,
    Delete,
    DeleteTrack,
    BatchStatus,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Deliver => "delivery",
            Action::Delete => "deletion",
            Action::DeleteTrack => "track deletion",
            Action::BatchStatus => "batch status update",
        })
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    /// The session was cleared by the gateway; the operator must sign in again.
    #[error("session expired: {0}")]
    AuthExpired(#[source] ApiError),

    /// The identifier was not added to the batch.
    #[error("could not validate {track_number}: {source}")]
    ValidationUnavailable {
        track_number: String,
        #[source]
        source: ApiError,
    },

    #[error("no eligible items for {0}")]
    NoEligibleItems(Action),

    /// Nothing in the batch changed. `detail` is the backend's message when it sent one.
    #[error("{action} failed: {detail}")]
    BulkActionFailed { action: Action, detail: String },

    #[error("index {index} out of range for batch of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The operator declined a confirmation; no request was sent.
    #[error("{0} cancelled")]
    Aborted(Action),

    #[error("backend unavailable: {0}")]
    Backend(#[source] ApiError),
}

impl ScanError {
    pub(crate) fn from_bulk(action: Action, err: ApiError) -> Self {
        if err.requires_login() {
            ScanError::AuthExpired(err)
        } else {
            ScanError::BulkActionFailed {
                action,
                detail: err.detail(),
            }
        }
    }

    pub(crate) fn from_read(err: ApiError) -> Self {
        if err.requires_login() {
            ScanError::AuthExpired(err)
        } else {
            ScanError::Backend(err)
        }
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, ScanError::AuthExpired(_))
    }
}
