//! Sign-in, registration, and account self-service.

use serde::{Deserialize, Serialize};
use tracing::info;
use trackdesk_core::{Credentials, UserProfile};

use crate::admin::UserRecord;
use crate::gateway::decode;
use crate::{ApiError, Gateway};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    user: UserProfile,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Self-registration form. New accounts are always clients.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub whatsapp: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_code: Option<String>,
}

#[derive(Clone)]
pub struct AuthApi {
    gateway: Gateway,
}

impl AuthApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Exchange email and password for a token and install it in the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials, ApiError> {
        let req = self.gateway.post("/api/auth/login").json(&LoginRequest {
            email: email.trim(),
            password,
        });
        let resp = self.gateway.send_login(req).await?;
        let login: LoginResponse = decode(resp).await?;

        let credentials = Credentials {
            token: login.access_token,
            user: login.user,
        };
        self.gateway.session().establish(credentials.clone())?;
        info!(email = %credentials.user.email, "signed in");
        Ok(credentials)
    }

    pub async fn register(&self, registration: &Registration) -> Result<UserRecord, ApiError> {
        let req = self.gateway.post("/api/auth/register").json(registration);
        let resp = self.gateway.send_public(req).await?;
        let user: UserRecord = decode(resp).await?;
        info!(email = %user.email, "account registered");
        Ok(user)
    }

    /// The signed-in user as the backend currently sees it.
    pub async fn me(&self) -> Result<UserRecord, ApiError> {
        self.gateway.send_json(self.gateway.get("/api/auth/me")).await
    }

    /// Change the signed-in user's password.
    ///
    /// Rejected locally, without a request, when the new password is shorter
    /// than six characters or equal to the old one. A wrong current password
    /// is [`ApiError::LoginFailed`] and leaves the session signed in.
    pub async fn change_password(&self, old: &str, new: &str) -> Result<(), ApiError> {
        check_new_password(old, new)?;
        let req = self
            .gateway
            .post("/api/auth/change-password")
            .form(&[("old_password", old), ("new_password", new)]);
        self.gateway.send_credential_check(req).await?;
        info!("password changed");
        Ok(())
    }

    /// Forget the session locally. The backend keeps no session state.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.gateway.session().clear()?;
        Ok(())
    }
}

fn check_new_password(old: &str, new: &str) -> Result<(), ApiError> {
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidInput(format!(
            "new password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if old == new {
        return Err(ApiError::InvalidInput(
            "new password must differ from the current one".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Form, Json, Router};
    use serde_json::{Value, json};
    use trackdesk_core::{Role, SessionContext};

    use super::*;
    use crate::testing::{admin_session, start_server};

    async fn login_handler(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if body["email"] == "ops@example.kz" && body["password"] == "hunter22" {
            (
                StatusCode::OK,
                Json(json!({
                    "access_token": "jwt-123",
                    "token_type": "bearer",
                    "user": {
                        "id": 3, "email": "ops@example.kz", "name": "Ops",
                        "personal_code": "1003", "role": "admin",
                        "branch": "Astana", "whatsapp": "+7700"
                    }
                })),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Incorrect email or password"})),
            )
        }
    }

    fn auth(base: String, session: SessionContext) -> AuthApi {
        AuthApi::new(Gateway::new(base, Duration::from_secs(5), session).unwrap())
    }

    #[tokio::test]
    async fn login_establishes_session() {
        let router = Router::new().route("/api/auth/login", post(login_handler));
        let session = SessionContext::anonymous();
        let api = auth(start_server(router).await, session.clone());

        let creds = api.login(" ops@example.kz ", "hunter22").await.unwrap();
        assert_eq!(creds.user.role, Role::Admin);
        assert_eq!(session.token().as_deref(), Some("jwt-123"));
        assert!(session.is_admin());
    }

    #[tokio::test]
    async fn bad_password_is_login_failure_not_expiry() {
        let router = Router::new().route("/api/auth/login", post(login_handler));
        let session = SessionContext::anonymous();
        let api = auth(start_server(router).await, session.clone());

        let err = api.login("ops@example.kz", "wrong").await.unwrap_err();
        match err {
            ApiError::LoginFailed(msg) => assert_eq!(msg, "Incorrect email or password"),
            other => panic!("expected LoginFailed, got {other:?}"),
        }
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn weak_new_password_is_rejected_locally() {
        let api = auth("http://127.0.0.1:9".into(), admin_session());
        assert!(matches!(
            api.change_password("oldpass", "abc").await.unwrap_err(),
            ApiError::InvalidInput(_)
        ));
        assert!(matches!(
            api.change_password("samepass", "samepass").await.unwrap_err(),
            ApiError::InvalidInput(_)
        ));
    }

    async fn change_password_handler(
        Form(form): Form<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        if form.get("old_password").map(String::as_str) == Some("oldpass1") {
            (StatusCode::OK, Json(json!({"message": "Password changed"})))
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Incorrect current password"})),
            )
        }
    }

    #[tokio::test]
    async fn wrong_current_password_keeps_session() {
        let router = Router::new().route("/api/auth/change-password", post(change_password_handler));
        let session = admin_session();
        let api = auth(start_server(router).await, session.clone());

        let err = api.change_password("guess", "newpass1").await.unwrap_err();
        match &err {
            ApiError::LoginFailed(msg) => assert_eq!(msg, "Incorrect current password"),
            other => panic!("expected LoginFailed, got {other:?}"),
        }
        assert!(!err.requires_login());
        assert!(session.is_authenticated());

        api.change_password("oldpass1", "newpass1").await.unwrap();
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn change_password_needs_a_session() {
        let api = auth("http://127.0.0.1:9".into(), SessionContext::anonymous());
        let err = api.change_password("oldpass1", "newpass1").await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[test]
    fn logout_clears_session() {
        let session = admin_session();
        let api = auth("http://127.0.0.1:9".into(), session.clone());
        api.logout().unwrap();
        assert!(session.token().is_none());
    }
}
