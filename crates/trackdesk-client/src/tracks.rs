//! Per-track operations. Each maps to exactly one backend call.

use serde::{Deserialize, Serialize};
use tracing::info;
use trackdesk_core::{TrackDetails, TrackStatus, UserTrack, normalize_track_number};

use crate::gateway::{decode, path_segment};
use crate::{ApiError, Gateway};

/// Result of binding a track to a client.
#[derive(Debug, Clone, Deserialize)]
pub struct Assignment {
    #[serde(flatten)]
    pub track: UserTrack,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub track_number: String,
    pub old_status: Option<TrackStatus>,
    pub new_status: TrackStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Serialize)]
struct AssignRequest<'a> {
    track_number: &'a str,
    personal_code: &'a str,
}

#[derive(Clone)]
pub struct TrackRegistry {
    gateway: Gateway,
}

impl TrackRegistry {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Public lookup; works without a session.
    pub async fn search(&self, track_number: &str) -> Result<TrackDetails, ApiError> {
        let n = path_segment(&normalize_track_number(track_number))?;
        let req = self.gateway.get(&format!("/api/tracks/search/{n}"));
        let resp = self.gateway.send_public(req).await?;
        decode(resp).await
    }

    /// Bind a track to a client's personal code. Clients may only assign to themselves.
    pub async fn assign(&self, track_number: &str, owner_code: &str) -> Result<Assignment, ApiError> {
        let n = normalize_track_number(track_number);
        let code = owner_code.trim();
        if n.is_empty() || code.is_empty() {
            return Err(ApiError::InvalidInput(
                "track number and personal code are required".into(),
            ));
        }
        let req = self.gateway.post("/api/tracks/assign").json(&AssignRequest {
            track_number: &n,
            personal_code: code,
        });
        let assignment: Assignment = self.gateway.send_json(req).await?;
        info!(track_number = %n, personal_code = %code, "track assigned");
        Ok(assignment)
    }

    /// Soft-remove a track from its owner's active list.
    pub async fn archive(&self, track_number: &str) -> Result<Message, ApiError> {
        let n = path_segment(&normalize_track_number(track_number))?;
        let req = self.gateway.post(&format!("/api/tracks/archive/{n}"));
        let msg = self.gateway.send_json(req).await?;
        info!(track_number = %n, "track archived");
        Ok(msg)
    }

    pub async fn update_status(
        &self,
        track_number: &str,
        new_status: &TrackStatus,
    ) -> Result<StatusChange, ApiError> {
        let n = path_segment(&normalize_track_number(track_number))?;
        let req = self
            .gateway
            .put(&format!("/api/admin/tracks/{n}/status"))
            .form(&[("new_status", new_status.label())]);
        let change: StatusChange = self.gateway.send_json(req).await?;
        info!(track_number = %n, status = %change.new_status, "track status updated");
        Ok(change)
    }

    /// Permanently remove a track. Irreversible; callers confirm first.
    pub async fn delete(&self, track_number: &str) -> Result<Message, ApiError> {
        let n = path_segment(&normalize_track_number(track_number))?;
        let req = self.gateway.delete(&format!("/api/admin/tracks/{n}"));
        let msg = self.gateway.send_json(req).await?;
        info!(track_number = %n, "track deleted");
        Ok(msg)
    }

    pub async fn user_tracks(&self, personal_code: &str) -> Result<Vec<UserTrack>, ApiError> {
        let code = path_segment(personal_code)?;
        let req = self.gateway.get(&format!("/api/users/{code}/tracks"));
        self.gateway.send_json(req).await
    }

    pub async fn archived_tracks(&self, personal_code: &str) -> Result<Vec<UserTrack>, ApiError> {
        let code = path_segment(personal_code)?;
        let req = self.gateway.get(&format!("/api/users/{code}/tracks/archived"));
        self.gateway.send_json(req).await
    }
}
