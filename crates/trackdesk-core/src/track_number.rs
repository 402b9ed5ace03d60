//! Tracking number normalisation.
//!
//! Barcode scanners and hand-typed input disagree on case and trailing
//! whitespace (most scanners terminate with `\r\n`, some pad with spaces).
//! The backend stores identifiers uppercase, so every identifier that leaves
//! this process goes through [`normalize_track_number`] first.
//!
//! # Wire format
//!
//! The scanner endpoints take a single form field holding a comma-joined list:
//! `track_numbers=AB1,CD2,EF3`. Identifiers therefore never contain commas.

/// Normalise a raw scanned or typed identifier: trim surrounding whitespace
/// and uppercase.
///
/// Returns an empty string for blank input; callers treat that as "nothing
/// scanned".
pub fn normalize_track_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Split a comma-separated list into normalised identifiers, dropping blanks.
///
/// Order is preserved and duplicates are kept; deduplication is the batch's job.
pub fn split_track_numbers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_track_number)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Join identifiers into the comma-separated form field value.
pub fn join_track_numbers<S: AsRef<str>>(numbers: &[S]) -> String {
    numbers
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}
