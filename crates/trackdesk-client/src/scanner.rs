//! Bulk scanner endpoints: validate, deliver, delete.
//!
//! All three take the same form body, `track_numbers=<comma-joined ids>`.

use serde::Deserialize;
use tracing::info;
use trackdesk_core::{ScannedTrackRecord, join_track_numbers, normalize_track_number};

use crate::{ApiError, Gateway};

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateResponse {
    #[serde(default)]
    pub total_scanned: usize,
    #[serde(default)]
    pub found: usize,
    #[serde(default)]
    pub not_found: usize,
    /// One entry per submitted identifier, in submission order.
    pub results: Vec<ScannedTrackRecord>,
}

/// Outcome of a bulk deliver or delete as reported by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkResponse {
    #[serde(alias = "delivered_count", alias = "deleted_count")]
    pub count: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl BulkResponse {
    /// Identifiers the backend explicitly reported as not processed.
    ///
    /// Errors are of the form `"<ID>: <reason>"`; entries without that shape are skipped.
    pub fn failed_track_numbers(&self) -> Vec<String> {
        self.errors
            .iter()
            .filter_map(|e| e.split_once(':'))
            .map(|(id, _)| normalize_track_number(id))
            .filter(|id| !id.is_empty() && !id.contains(char::is_whitespace))
            .collect()
    }
}

#[derive(Clone)]
pub struct ScannerApi {
    gateway: Gateway,
}

impl ScannerApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Look up each identifier. An empty slice returns an empty response without a request.
    pub async fn validate(&self, track_numbers: &[String]) -> Result<ValidateResponse, ApiError> {
        if track_numbers.is_empty() {
            return Ok(ValidateResponse {
                total_scanned: 0,
                found: 0,
                not_found: 0,
                results: Vec::new(),
            });
        }
        let resp: ValidateResponse = self.post_batch("/api/admin/scanner/validate", track_numbers).await?;
        info!(
            scanned = resp.total_scanned,
            found = resp.found,
            not_found = resp.not_found,
            "validated scanned tracks"
        );
        Ok(resp)
    }

    pub async fn deliver(&self, track_numbers: &[String]) -> Result<BulkResponse, ApiError> {
        let resp: BulkResponse = self.post_batch("/api/admin/scanner/deliver", track_numbers).await?;
        info!(
            attempted = track_numbers.len(),
            delivered = resp.count,
            errors = resp.errors.len(),
            "bulk delivery complete"
        );
        Ok(resp)
    }

    pub async fn delete(&self, track_numbers: &[String]) -> Result<BulkResponse, ApiError> {
        let resp: BulkResponse = self.post_batch("/api/admin/scanner/delete", track_numbers).await?;
        info!(
            attempted = track_numbers.len(),
            deleted = resp.count,
            errors = resp.errors.len(),
            "bulk deletion complete"
        );
        Ok(resp)
    }

    async fn post_batch<R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        track_numbers: &[String],
    ) -> Result<R, ApiError> {
        let joined = join_track_numbers(track_numbers);
        let req = self.gateway.post(path).form(&[("track_numbers", joined)]);
        self.gateway.send_json(req).await
    }
}
