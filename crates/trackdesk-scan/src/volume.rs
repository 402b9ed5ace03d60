//! Shipment volume by departure date.

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use trackdesk_client::admin::BatchStatusUpdate;
use trackdesk_core::{TrackStatus, VolumeDay};

use crate::{Action, CalendarBackend, ConfirmationPolicy, RefreshSignal, ScanError};

/// Cached per-day counts, refetched when the shared [`RefreshSignal`] moves.
pub struct VolumeView<S> {
    source: S,
    refresh: RefreshSignal,
    days: Vec<VolumeDay>,
    /// Generation the cache was fetched at; `None` before the first fetch.
    fetched_at: Option<u64>,
}

impl<S: CalendarBackend> VolumeView<S> {
    pub fn new(source: S, refresh: RefreshSignal) -> Self {
        Self {
            source,
            refresh,
            days: Vec::new(),
            fetched_at: None,
        }
    }

    pub async fn fetch(&mut self) -> Result<&[VolumeDay], ScanError> {
        let generation = self.refresh.generation();
        self.days = self
            .source
            .tracks_by_date()
            .await
            .map_err(ScanError::from_read)?;
        self.fetched_at = Some(generation);
        debug!(days = self.days.len(), generation, "volume fetched");
        Ok(&self.days)
    }

    pub fn is_stale(&self) -> bool {
        self.fetched_at != Some(self.refresh.generation())
    }

    /// Refetch only when something changed since the last fetch.
    pub async fn refresh_if_stale(&mut self) -> Result<&[VolumeDay], ScanError> {
        if self.is_stale() {
            self.fetch().await
        } else {
            Ok(&self.days)
        }
    }

    pub fn days(&self) -> &[VolumeDay] {
        &self.days
    }

    pub fn total(&self) -> usize {
        self.days.iter().map(|d| d.count).sum()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&VolumeDay> {
        self.days.iter().find(|d| d.date == date)
    }

    /// Set `status` on every track that departed on `date`, after confirmation.
    ///
    /// Bumps the shared signal and refetches on success. The update is
    /// returned even when the refetch fails; the view then stays stale and
    /// the next [`refresh_if_stale`](Self::refresh_if_stale) retries.
    pub async fn apply_status<C>(
        &mut self,
        date: NaiveDate,
        status: &TrackStatus,
        confirm: &C,
    ) -> Result<BatchStatusUpdate, ScanError>
    where
        C: ConfirmationPolicy + ?Sized,
    {
        let count = self.day(date).map(|d| d.count).unwrap_or(0);
        let prompt = format!(
            "Set status \"{status}\" on all {count} track(s) that departed {}?",
            date.format("%Y-%m-%d")
        );
        if !confirm.confirm(&prompt) {
            return Err(ScanError::Aborted(Action::BatchStatus));
        }

        let update = self
            .source
            .batch_update_status(date, status)
            .await
            .map_err(|e| ScanError::from_bulk(Action::BatchStatus, e))?;
        info!(date = %date, updated = update.updated_count, "batch status applied");

        self.refresh.bump();
        if let Err(e) = self.fetch().await {
            warn!(error = %e, "volume refetch failed after batch status change");
        }
        Ok(update)
    }
}
