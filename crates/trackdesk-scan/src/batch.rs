//! The in-memory scan batch.

use std::collections::HashSet;

use trackdesk_core::ScannedTrackRecord;

use crate::ScanError;

/// Scanned, validated records in scan order. No two records share a track number.
///
/// Counts are derived on demand. The batch is working memory for one scanner
/// session and is never persisted.
#[derive(Debug, Clone, Default)]
pub struct ScanBatch {
    records: Vec<ScannedTrackRecord>,
}

impl ScanBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ScannedTrackRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, track_number: &str) -> bool {
        self.records.iter().any(|r| r.track_number == track_number)
    }

    pub fn scanned_count(&self) -> usize {
        self.records.len()
    }

    pub fn deliverable_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_deliverable()).count()
    }

    pub fn deletable_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_deletable()).count()
    }

    pub fn deliverable_ids(&self) -> Vec<String> {
        self.ids_where(ScannedTrackRecord::is_deliverable)
    }

    pub fn deletable_ids(&self) -> Vec<String> {
        self.ids_where(ScannedTrackRecord::is_deletable)
    }

    pub fn track_numbers(&self) -> Vec<String> {
        self.ids_where(|_| true)
    }

    /// Append unless the track number is already present. Returns whether it was added.
    pub(crate) fn push(&mut self, record: ScannedTrackRecord) -> bool {
        if self.contains(&record.track_number) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn remove_at(&mut self, index: usize) -> Result<ScannedTrackRecord, ScanError> {
        if index >= self.records.len() {
            return Err(ScanError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    /// Remove every record whose track number is in `track_numbers`.
    pub(crate) fn remove_all(&mut self, track_numbers: &[String]) -> usize {
        let drop: HashSet<&str> = track_numbers.iter().map(String::as_str).collect();
        let before = self.records.len();
        self.records.retain(|r| !drop.contains(r.track_number.as_str()));
        before - self.records.len()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn ids_where(&self, pred: impl Fn(&ScannedTrackRecord) -> bool) -> Vec<String> {
        self.records
            .iter()
            .filter(|&r| pred(r))
            .map(|r| r.track_number.clone())
            .collect()
    }
}
