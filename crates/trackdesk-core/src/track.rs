//! Track records as exchanged with the tracking backend.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::TrackStatus;

/// One scanned identifier after backend validation.
///
/// Not-found entries carry only `track_number` and `found = false`; every other
/// field falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedTrackRecord {
    pub track_number: String,
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub status: Option<TrackStatus>,
    #[serde(default)]
    pub can_deliver: bool,
    #[serde(default)]
    pub personal_code: Option<String>,
}

impl ScannedTrackRecord {
    pub fn not_found(track_number: impl Into<String>) -> Self {
        Self {
            track_number: track_number.into(),
            found: false,
            status: None,
            can_deliver: false,
            personal_code: None,
        }
    }

    /// Eligible for bulk delivery: known to the backend and at a final holding point.
    pub fn is_deliverable(&self) -> bool {
        self.found && self.can_deliver
    }

    /// Eligible for bulk deletion: known to the backend.
    pub fn is_deletable(&self) -> bool {
        self.found
    }
}

/// One step of a track's status history, pre-rendered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub status: String,
    /// `dd.mm.YYYY HH:MM`, or a placeholder for steps not yet reached.
    pub date: String,
    pub completed: bool,
}

/// Public search result for a single tracking number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackDetails {
    pub track_number: String,
    pub current_status: Option<TrackStatus>,
    #[serde(default)]
    pub is_assigned: bool,
    pub personal_code: Option<String>,
    pub departure_date: Option<NaiveDate>,
    #[serde(default)]
    pub status_timeline: Vec<TimelineEvent>,
}

/// A track bound to a client's personal code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTrack {
    pub track_number: String,
    pub status: Option<TrackStatus>,
    pub departure_date: Option<NaiveDate>,
    pub personal_code: Option<String>,
    #[serde(default)]
    pub status_timeline: Vec<TimelineEvent>,
}

/// Shipments that left the origin warehouse on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub title: String,
    pub count: usize,
    #[serde(default)]
    pub tracks: Vec<VolumeTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeTrack {
    pub track_number: String,
    pub status: Option<TrackStatus>,
    pub personal_code: Option<String>,
    #[serde(default)]
    pub is_assigned: bool,
}
