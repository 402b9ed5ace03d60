//! Backend seams for the scanner workflow, implemented by the HTTP client.

use chrono::NaiveDate;
use trackdesk_client::admin::BatchStatusUpdate;
use trackdesk_client::tracks::Message;
use trackdesk_client::{AdminApi, ApiError, BulkResponse, ScannerApi, TrackRegistry};
use trackdesk_core::{ScannedTrackRecord, TrackStatus, VolumeDay};

/// Bulk scanner operations.
#[async_trait::async_trait]
pub trait ScanBackend: Send + Sync {
    /// One record per identifier, in input order.
    async fn validate(&self, track_numbers: &[String]) -> Result<Vec<ScannedTrackRecord>, ApiError>;

    async fn deliver(&self, track_numbers: &[String]) -> Result<BulkResponse, ApiError>;

    async fn delete(&self, track_numbers: &[String]) -> Result<BulkResponse, ApiError>;
}

#[async_trait::async_trait]
impl ScanBackend for ScannerApi {
    async fn validate(&self, track_numbers: &[String]) -> Result<Vec<ScannedTrackRecord>, ApiError> {
        Ok(ScannerApi::validate(self, track_numbers).await?.results)
    }

    async fn deliver(&self, track_numbers: &[String]) -> Result<BulkResponse, ApiError> {
        ScannerApi::deliver(self, track_numbers).await
    }

    async fn delete(&self, track_numbers: &[String]) -> Result<BulkResponse, ApiError> {
        ScannerApi::delete(self, track_numbers).await
    }
}

/// Shipment volume by departure date, and the batch status action behind it.
#[async_trait::async_trait]
pub trait CalendarBackend: Send + Sync {
    async fn tracks_by_date(&self) -> Result<Vec<VolumeDay>, ApiError>;

    async fn batch_update_status(
        &self,
        departure_date: NaiveDate,
        new_status: &TrackStatus,
    ) -> Result<BatchStatusUpdate, ApiError>;
}

#[async_trait::async_trait]
impl CalendarBackend for AdminApi {
    async fn tracks_by_date(&self) -> Result<Vec<VolumeDay>, ApiError> {
        AdminApi::tracks_by_date(self).await
    }

    async fn batch_update_status(
        &self,
        departure_date: NaiveDate,
        new_status: &TrackStatus,
    ) -> Result<BatchStatusUpdate, ApiError> {
        AdminApi::batch_update_status(self, departure_date, new_status).await
    }
}

/// Hard delete of a single track.
#[async_trait::async_trait]
pub trait TrackDeletion: Send + Sync {
    async fn delete_track(&self, track_number: &str) -> Result<Message, ApiError>;
}

#[async_trait::async_trait]
impl TrackDeletion for TrackRegistry {
    async fn delete_track(&self, track_number: &str) -> Result<Message, ApiError> {
        self.delete(track_number).await
    }
}
