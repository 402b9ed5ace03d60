//! Scan batch accumulator.
//!
//! Turns a stream of scanned identifiers into a de-duplicated, validated batch
//! and runs bulk actions on it:
//!
//! - **deliver** sends every `found && can_deliver` record after one
//!   confirmation listing them, then removes only the identifiers the backend
//!   processed. Not-found and non-deliverable records stay.
//! - **delete** sends every `found` record after a yes/no confirmation and a
//!   typed challenge ([`BATCH_DELETE_WORD`]), then empties the whole batch.
//!
//! A failed request leaves the batch untouched. Every method takes `&mut self`,
//! so a second bulk action cannot start while one is in flight.

use tracing::{debug, info, warn};
use trackdesk_client::BulkResponse;
use trackdesk_core::{ScannedTrackRecord, normalize_track_number};

use crate::{
    Action, ConfirmationPolicy, RefreshSignal, ScanBackend, ScanBatch, ScanError, TrackDeletion,
};

/// The word an operator must type to confirm a batch deletion.
pub const BATCH_DELETE_WORD: &str = "DELETE";

/// What to do when the backend reports fewer processed items than were sent
/// and does not say which ones failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    /// Remove every attempted identifier anyway.
    #[default]
    RemoveAttempted,
    /// Keep every attempted identifier so the operator can inspect and retry.
    RemoveNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Added { index: usize },
    /// Blank input.
    Empty,
    /// Already in the batch after normalisation.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResult {
    pub action: Action,
    /// Identifiers sent to the backend.
    pub attempted: Vec<String>,
    /// Count reported by the backend. Authoritative for operator messages.
    pub reported: u64,
    /// Identifiers dropped from the batch.
    pub removed: Vec<String>,
    /// Backend error strings, verbatim.
    pub errors: Vec<String>,
}

impl BulkResult {
    /// Whether the backend processed fewer items than were sent.
    pub fn is_partial(&self) -> bool {
        (self.reported as usize) < self.attempted.len()
    }

    /// Attempted identifiers still in the batch.
    pub fn kept_count(&self) -> usize {
        self.attempted
            .iter()
            .filter(|id| !self.removed.contains(id))
            .count()
    }
}

pub struct Accumulator<B, C> {
    backend: B,
    confirm: C,
    batch: ScanBatch,
    policy: RemovalPolicy,
    refresh: RefreshSignal,
}

impl<B: ScanBackend, C: ConfirmationPolicy> Accumulator<B, C> {
    pub fn new(backend: B, confirm: C) -> Self {
        Self {
            backend,
            confirm,
            batch: ScanBatch::new(),
            policy: RemovalPolicy::default(),
            refresh: RefreshSignal::new(),
        }
    }

    pub fn with_policy(mut self, policy: RemovalPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Share a refresh signal with other views; bumped after every successful bulk action.
    pub fn with_refresh(mut self, refresh: RefreshSignal) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn batch(&self) -> &ScanBatch {
        &self.batch
    }

    pub fn refresh_signal(&self) -> &RefreshSignal {
        &self.refresh
    }

    /// Normalise, de-duplicate, validate, append.
    ///
    /// Blank and already-present input is ignored without a request. On a
    /// validation failure nothing is added.
    pub async fn submit_scan(&mut self, raw: &str) -> Result<ScanOutcome, ScanError> {
        let track_number = normalize_track_number(raw);
        if track_number.is_empty() {
            return Ok(ScanOutcome::Empty);
        }
        if self.batch.contains(&track_number) {
            debug!(track_number = %track_number, "duplicate scan ignored");
            return Ok(ScanOutcome::Duplicate);
        }

        let record = self.validate(&track_number).await?;
        let index = self.batch.scanned_count();
        if !self.batch.push(record) {
            return Ok(ScanOutcome::Duplicate);
        }
        info!(
            track_number = %track_number,
            found = self.batch.records()[index].found,
            scanned = self.batch.scanned_count(),
            "scan added"
        );
        Ok(ScanOutcome::Added { index })
    }

    /// Validate a single identifier.
    pub async fn validate(&self, track_number: &str) -> Result<ScannedTrackRecord, ScanError> {
        let ids = [track_number.to_string()];
        let records = self.validate_many(&ids).await?;
        records
            .into_iter()
            .next()
            .ok_or_else(|| reply_mismatch(&ids, 0))
    }

    /// Validate several identifiers in one request, preserving order.
    ///
    /// Records come back with the submitted identifier, so a backend that
    /// echoes a different spelling does not break de-duplication. A reply
    /// with a different number of records cannot be matched up and is
    /// [`ScanError::ValidationUnavailable`].
    pub async fn validate_many(
        &self,
        track_numbers: &[String],
    ) -> Result<Vec<ScannedTrackRecord>, ScanError> {
        let records = self.backend.validate(track_numbers).await.map_err(|e| {
            if e.requires_login() {
                ScanError::AuthExpired(e)
            } else {
                ScanError::ValidationUnavailable {
                    track_number: track_numbers.join(","),
                    source: e,
                }
            }
        })?;
        if records.len() != track_numbers.len() {
            warn!(
                submitted = track_numbers.len(),
                returned = records.len(),
                "validation reply does not match the request"
            );
            return Err(reply_mismatch(track_numbers, records.len()));
        }
        Ok(records
            .into_iter()
            .zip(track_numbers)
            .map(|(mut record, submitted)| {
                record.track_number = submitted.clone();
                record
            })
            .collect())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<ScannedTrackRecord, ScanError> {
        let record = self.batch.remove_at(index)?;
        debug!(track_number = %record.track_number, index, "scan dismissed");
        Ok(record)
    }

    /// Empty the batch. Callers confirm with the operator first.
    pub fn clear(&mut self) {
        let dropped = self.batch.scanned_count();
        self.batch.clear();
        info!(dropped, "scan batch cleared");
    }

    /// Deliver every deliverable record.
    pub async fn deliver_selected(&mut self) -> Result<BulkResult, ScanError> {
        let ids = self.batch.deliverable_ids();
        if ids.is_empty() {
            return Err(ScanError::NoEligibleItems(Action::Deliver));
        }

        let prompt = format!(
            "Deliver {} parcel(s) to their clients?\n{}",
            ids.len(),
            ids.join("\n")
        );
        if !self.confirm.confirm(&prompt) {
            return Err(ScanError::Aborted(Action::Deliver));
        }

        let resp = self
            .backend
            .deliver(&ids)
            .await
            .map_err(|e| ScanError::from_bulk(Action::Deliver, e))?;

        let removed = confirmed_ids(&ids, &resp, self.policy);
        self.batch.remove_all(&removed);
        self.refresh.bump();

        if (resp.count as usize) < ids.len() {
            warn!(
                attempted = ids.len(),
                delivered = resp.count,
                removed = removed.len(),
                "partial delivery"
            );
        }
        info!(delivered = resp.count, remaining = self.batch.scanned_count(), "delivery done");

        Ok(BulkResult {
            action: Action::Deliver,
            attempted: ids,
            reported: resp.count,
            removed,
            errors: resp.errors,
        })
    }

    /// Permanently delete every found record, then reset the batch.
    pub async fn delete_selected(&mut self) -> Result<BulkResult, ScanError> {
        let ids = self.batch.deletable_ids();
        if ids.is_empty() {
            return Err(ScanError::NoEligibleItems(Action::Delete));
        }

        let prompt = format!(
            "Permanently delete {} parcel(s)? This cannot be undone.",
            ids.len()
        );
        if !self.confirm.confirm(&prompt) {
            return Err(ScanError::Aborted(Action::Delete));
        }
        let challenge = format!("Type {BATCH_DELETE_WORD} to confirm");
        if !self.confirm.challenge(&challenge, BATCH_DELETE_WORD) {
            return Err(ScanError::Aborted(Action::Delete));
        }

        let resp = self
            .backend
            .delete(&ids)
            .await
            .map_err(|e| ScanError::from_bulk(Action::Delete, e))?;

        let removed = self.batch.track_numbers();
        self.batch.clear();
        self.refresh.bump();
        info!(deleted = resp.count, attempted = ids.len(), "deletion done, batch reset");

        Ok(BulkResult {
            action: Action::Delete,
            attempted: ids,
            reported: resp.count,
            removed,
            errors: resp.errors,
        })
    }
}

fn reply_mismatch(submitted: &[String], returned: usize) -> ScanError {
    ScanError::ValidationUnavailable {
        track_number: submitted.join(","),
        source: trackdesk_client::ApiError::Decode(format!(
            "expected {} validation result(s), got {returned}",
            submitted.len()
        )),
    }
}

/// Which attempted identifiers to drop after a successful bulk call.
fn confirmed_ids(attempted: &[String], resp: &BulkResponse, policy: RemovalPolicy) -> Vec<String> {
    let failed: Vec<String> = resp
        .failed_track_numbers()
        .into_iter()
        .filter(|f| attempted.contains(f))
        .collect();
    if !failed.is_empty() {
        return attempted
            .iter()
            .filter(|id| !failed.contains(id))
            .cloned()
            .collect();
    }
    if resp.count as usize >= attempted.len() {
        return attempted.to_vec();
    }
    match policy {
        RemovalPolicy::RemoveAttempted => attempted.to_vec(),
        RemovalPolicy::RemoveNone => Vec::new(),
    }
}

/// Delete one track after a yes/no confirmation and a challenge to retype
/// its exact identifier.
pub async fn delete_track<D, C>(
    deleter: &D,
    confirm: &C,
    track_number: &str,
) -> Result<String, ScanError>
where
    D: TrackDeletion + ?Sized,
    C: ConfirmationPolicy + ?Sized,
{
    let n = normalize_track_number(track_number);
    if n.is_empty() {
        return Err(ScanError::NoEligibleItems(Action::DeleteTrack));
    }
    if !confirm.confirm(&format!("Permanently delete track {n}?")) {
        return Err(ScanError::Aborted(Action::DeleteTrack));
    }
    if !confirm.challenge(&format!("Type the track number ({n}) to confirm"), &n) {
        return Err(ScanError::Aborted(Action::DeleteTrack));
    }
    let msg = deleter
        .delete_track(&n)
        .await
        .map_err(|e| ScanError::from_bulk(Action::DeleteTrack, e))?;
    Ok(msg.message)
}
