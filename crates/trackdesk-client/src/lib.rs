//! HTTP client for the tracking backend: the authenticated gateway plus typed
//! endpoint groups built on it.

mod error;
mod gateway;

pub mod admin;
pub mod auth;
pub mod scanner;
pub mod tracks;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use error::ApiError;
pub use gateway::Gateway;
pub use scanner::{BulkResponse, ScannerApi, ValidateResponse};
pub use tracks::TrackRegistry;

#[cfg(test)]
pub(crate) mod testing;
