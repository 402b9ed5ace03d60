//! Admin-only endpoints: user management, bulk upload, calendar volume,
//! batch status by departure date.

use std::path::Path;

use chrono::NaiveDate;
use reqwest::multipart;
use serde::Deserialize;
use tracing::info;
use trackdesk_core::{Role, TrackStatus, VolumeDay};

use crate::{ApiError, Gateway};

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub personal_code: Option<String>,
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Fields for an admin-created account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub whatsapp: String,
    pub branch: String,
    /// Assigned by the backend when absent.
    pub personal_code: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordReset {
    pub user_email: String,
    #[serde(default)]
    pub user_name: Option<String>,
    pub new_password: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadReport {
    pub count: usize,
    /// First few processed identifiers only.
    #[serde(default)]
    pub processed_tracks: Vec<String>,
    /// First few error messages only; see `total_errors`.
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub total_errors: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchStatusUpdate {
    pub updated_count: usize,
    pub departure_date: NaiveDate,
    pub new_status: TrackStatus,
    /// First few affected identifiers only.
    #[serde(default)]
    pub tracks: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Message {
    message: String,
}

#[derive(Clone)]
pub struct AdminApi {
    gateway: Gateway,
}

impl AdminApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        self.gateway.send_json(self.gateway.get("/api/users")).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<UserRecord, ApiError> {
        let role = match user.role {
            Role::Admin => "admin",
            _ => "client",
        };
        let mut form = vec![
            ("name", user.name.as_str()),
            ("email", user.email.as_str()),
            ("password", user.password.as_str()),
            ("whatsapp", user.whatsapp.as_str()),
            ("branch", user.branch.as_str()),
            ("role", role),
        ];
        if let Some(code) = user.personal_code.as_deref() {
            form.push(("personal_code", code));
        }
        let req = self.gateway.post("/api/users").form(&form);
        let created: UserRecord = self.gateway.send_json(req).await?;
        info!(id = created.id, email = %created.email, "user created");
        Ok(created)
    }

    pub async fn delete_user(&self, id: i64) -> Result<String, ApiError> {
        let req = self.gateway.delete(&format!("/api/users/{id}"));
        let msg: Message = self.gateway.send_json(req).await?;
        info!(id, "user deleted");
        Ok(msg.message)
    }

    pub async fn reset_password(&self, id: i64, new_password: &str) -> Result<PasswordReset, ApiError> {
        let req = self
            .gateway
            .post(&format!("/api/admin/users/{id}/reset-password"))
            .form(&[("new_password", new_password)]);
        let reset: PasswordReset = self.gateway.send_json(req).await?;
        info!(id, email = %reset.user_email, "password reset");
        Ok(reset)
    }

    pub async fn generate_password(&self, id: i64) -> Result<PasswordReset, ApiError> {
        let req = self
            .gateway
            .post(&format!("/api/admin/users/{id}/generate-password"));
        let reset: PasswordReset = self.gateway.send_json(req).await?;
        info!(id, email = %reset.user_email, "password generated");
        Ok(reset)
    }

    /// Upload a list of tracking numbers (`.xlsx`, `.csv`, or one per line) that
    /// left the origin warehouse on `departure_date` with `status`.
    pub async fn upload_tracks(
        &self,
        file: &Path,
        departure_date: NaiveDate,
        status: &TrackStatus,
    ) -> Result<UploadReport, ApiError> {
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::InvalidInput(format!("not a file: {}", file.display())))?
            .to_string();
        let bytes = tokio::fs::read(file).await?;
        let size = bytes.len();

        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name.clone()))
            .text("departure_date", departure_date.format("%Y-%m-%d").to_string())
            .text("status", status.label().to_string());

        let req = self.gateway.post("/api/tracks").multipart(form);
        let report: UploadReport = self.gateway.send_json(req).await?;
        info!(
            file = %file_name,
            bytes = size,
            count = report.count,
            errors = report.total_errors,
            "tracks uploaded"
        );
        Ok(report)
    }

    /// Shipment counts grouped by departure date.
    pub async fn tracks_by_date(&self) -> Result<Vec<VolumeDay>, ApiError> {
        let mut days: Vec<VolumeDay> = self
            .gateway
            .send_json(self.gateway.get("/api/admin/tracks-by-date"))
            .await?;
        days.sort_by_key(|d| d.date);
        Ok(days)
    }

    /// Set `new_status` on every track that departed on `departure_date`.
    pub async fn batch_update_status(
        &self,
        departure_date: NaiveDate,
        new_status: &TrackStatus,
    ) -> Result<BatchStatusUpdate, ApiError> {
        let date = departure_date.format("%Y-%m-%d").to_string();
        let req = self.gateway.post("/api/admin/batch-update-status").form(&[
            ("departure_date", date.as_str()),
            ("new_status", new_status.label()),
        ]);
        let update: BatchStatusUpdate = self.gateway.send_json(req).await?;
        info!(
            date = %date,
            status = %update.new_status,
            updated = update.updated_count,
            "batch status update complete"
        );
        Ok(update)
    }

    /// Find a user by email or personal code in the full listing.
    pub async fn find_user(&self, email_or_code: &str) -> Result<UserRecord, ApiError> {
        let needle = email_or_code.trim().to_string();
        self.list_users()
            .await?
            .into_iter()
            .find(|u| {
                u.email.eq_ignore_ascii_case(&needle)
                    || u.personal_code.as_deref() == Some(needle.as_str())
            })
            .ok_or_else(|| ApiError::InvalidInput(format!("no user matching {needle:?}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::routing::{get, post};
    use axum::{Form, Json, Router};
    use serde_json::json;

    use super::*;
    use crate::testing::{admin_session, start_server};

    fn admin(base: String) -> AdminApi {
        AdminApi::new(Gateway::new(base, Duration::from_secs(5), admin_session()).unwrap())
    }

    #[tokio::test]
    async fn calendar_is_sorted_by_date() {
        let router = Router::new().route(
            "/api/admin/tracks-by-date",
            get(|| async {
                Json(json!([
                    {"date": "2025-03-20", "title": "1 посылок", "count": 1, "tracks": []},
                    {"date": "2025-03-01", "title": "4 посылок", "count": 4, "tracks": []}
                ]))
            }),
        );
        let days = admin(start_server(router).await).tracks_by_date().await.unwrap();
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(days[1].count, 1);
    }

    #[tokio::test]
    async fn batch_status_posts_date_and_label() {
        let router = Router::new().route(
            "/api/admin/batch-update-status",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                Json(json!({
                    "success": true,
                    "updated_count": 12,
                    "departure_date": form["departure_date"],
                    "new_status": form["new_status"],
                    "tracks": ["AB1"]
                }))
            }),
        );
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let update = admin(start_server(router).await)
            .batch_update_status(date, &TrackStatus::InTransit)
            .await
            .unwrap();
        assert_eq!(update.updated_count, 12);
        assert_eq!(update.departure_date, date);
        assert_eq!(update.new_status, TrackStatus::InTransit);
    }

    #[tokio::test]
    async fn create_user_omits_missing_personal_code() {
        let router = Router::new().route(
            "/api/users",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                Json(json!({
                    "id": 5,
                    "email": form["email"],
                    "name": form["name"],
                    "whatsapp": form["whatsapp"],
                    "branch": form["branch"],
                    "personal_code": form.get("personal_code").cloned().unwrap_or_else(|| "1005".into()),
                    "role": form["role"],
                }))
            }),
        );
        let created = admin(start_server(router).await)
            .create_user(&NewUser {
                name: "Aigerim".into(),
                email: "aigerim@example.kz".into(),
                password: "secret1".into(),
                whatsapp: "+77010000000".into(),
                branch: "Almaty".into(),
                personal_code: None,
                role: Role::Client,
            })
            .await
            .unwrap();
        assert_eq!(created.personal_code.as_deref(), Some("1005"));
        assert_eq!(created.role, Role::Client);
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn upload_reports_counts() {
        let router = Router::new().route(
            "/api/tracks",
            post(|| async {
                Json(json!({
                    "success": true,
                    "count": 2,
                    "processed_tracks": ["AB1", "CD2"],
                    "errors": [],
                    "total_errors": 0
                }))
            }),
        );
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("batch.txt");
        std::fs::write(&file, "AB1\nCD2\n").unwrap();

        let report = admin(start_server(router).await)
            .upload_tracks(
                &file,
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                &TrackStatus::LeftOrigin,
            )
            .await
            .unwrap();
        assert_eq!(report.count, 2);
        assert_eq!(report.processed_tracks, vec!["AB1", "CD2"]);
    }
}
