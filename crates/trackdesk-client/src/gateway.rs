//! Authenticated request gateway.
//!
//! Every backend call goes through [`Gateway`]. Authenticated calls get the
//! session's bearer token; a 401 or 403 from any endpoint clears the session
//! and surfaces as [`ApiError::AuthExpired`]. Once cleared, further
//! authenticated calls fail with [`ApiError::NotAuthenticated`] before a
//! request is built. There are no retries.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use trackdesk_core::{Config, SessionContext};

use crate::ApiError;

#[derive(Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    session: SessionContext,
}

impl Gateway {
    /// `base_url` should be like `http://localhost:8000` (no trailing slash).
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: SessionContext,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            session,
        })
    }

    pub fn from_config(config: &Config, session: SessionContext) -> Result<Self, ApiError> {
        Self::new(config.base_url.clone(), config.timeout(), session)
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.http.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path))
    }

    /// Send with the session's bearer token.
    pub async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let token = self.session.token().ok_or(ApiError::NotAuthenticated)?;
        let resp = req.bearer_auth(token).send().await.map_err(|e| self.transport(e))?;
        self.check(resp).await
    }

    /// Send without credentials. Authorization failures are still honoured.
    pub async fn send_public(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await.map_err(|e| self.transport(e))?;
        self.check(resp).await
    }

    /// Send without credentials and without the authorization-failure side effect.
    ///
    /// Only for the login exchange, where a 401 means wrong password rather
    /// than an expired session.
    pub(crate) async fn send_login(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await.map_err(|e| self.transport(e))?;
        credential_check(resp).await
    }

    /// Send with the bearer token, treating a 401 or 403 as a rejected
    /// credential in the body rather than an expired session.
    ///
    /// For endpoints that verify a password the operator typed, such as a
    /// password change. The session is kept.
    pub(crate) async fn send_credential_check(
        &self,
        req: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let token = self.session.token().ok_or(ApiError::NotAuthenticated)?;
        let resp = req.bearer_auth(token).send().await.map_err(|e| self.transport(e))?;
        credential_check(resp).await
    }

    /// Authenticated send, decoding a JSON body.
    pub async fn send_json<R: DeserializeOwned>(&self, req: RequestBuilder) -> Result<R, ApiError> {
        let resp = self.send(req).await?;
        decode(resp).await
    }

    async fn check(&self, resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        debug!(url = %resp.url(), status = status.as_u16(), "backend response");
        if status.is_success() {
            return Ok(resp);
        }

        let message = error_detail(resp).await;
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!(status = status.as_u16(), "authorization failed, clearing session");
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "failed to remove persisted session");
            }
            return Err(ApiError::AuthExpired {
                status: status.as_u16(),
                message,
            });
        }

        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }

    fn transport(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Network(e)
        }
    }
}

async fn credential_check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = error_detail(resp).await;
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(ApiError::LoginFailed(message));
    }
    Err(ApiError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Decode a successful JSON response.
pub(crate) async fn decode<R: DeserializeOwned>(resp: Response) -> Result<R, ApiError> {
    let body = resp.text().await.map_err(ApiError::Network)?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("response body: {e}")))
}

/// Pull the backend's `detail` field out of an error body, falling back to the raw text.
async fn error_detail(resp: Response) -> String {
    let body = resp.text().await.unwrap_or_default();
    detail_from_body(&body)
}

fn detail_from_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        _ => body.to_string(),
    }
}

/// Validate an identifier for use as a single URL path segment.
pub(crate) fn path_segment(raw: &str) -> Result<String, ApiError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ApiError::InvalidInput("empty identifier".into()));
    }
    if !s
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(ApiError::InvalidInput(format!("unsupported characters in {s:?}")));
    }
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use serde_json::json;

    use super::*;
    use crate::testing::{admin_session, start_server};

    #[derive(serde::Deserialize)]
    struct Echo {
        authorization: Option<String>,
    }

    fn echo_router() -> Router {
        Router::new().route(
            "/echo",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                axum::Json(json!({ "authorization": auth }))
            }),
        )
    }

    #[tokio::test]
    async fn attaches_bearer_token() {
        let base = start_server(echo_router()).await;
        let gw = Gateway::new(base, Duration::from_secs(5), admin_session()).unwrap();

        let echo: Echo = gw.send_json(gw.get("/echo")).await.unwrap();
        assert_eq!(echo.authorization.as_deref(), Some("Bearer test-token"));
    }

    #[tokio::test]
    async fn public_send_carries_no_token() {
        let base = start_server(echo_router()).await;
        let gw = Gateway::new(base, Duration::from_secs(5), admin_session()).unwrap();

        let resp = gw.send_public(gw.get("/echo")).await.unwrap();
        let echo: Echo = decode(resp).await.unwrap();
        assert!(echo.authorization.is_none());
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_blocks_further_calls() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/api/admin/tracks-by-date",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (
                        StatusCode::UNAUTHORIZED,
                        axum::Json(json!({ "detail": "Could not validate credentials" })),
                    )
                }
            }),
        );
        let base = start_server(router).await;
        let session = admin_session();
        let gw = Gateway::new(base, Duration::from_secs(5), session.clone()).unwrap();

        let err = gw.send(gw.get("/api/admin/tracks-by-date")).await.unwrap_err();
        match err {
            ApiError::AuthExpired { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Could not validate credentials");
            }
            other => panic!("expected AuthExpired, got {other:?}"),
        }
        assert!(session.token().is_none());

        let err = gw.send(gw.get("/api/admin/tracks-by-date")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
        assert!(err.requires_login());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn forbidden_is_treated_like_unauthorized() {
        let router = Router::new().route(
            "/api/users",
            get(|| async {
                (
                    StatusCode::FORBIDDEN,
                    axum::Json(json!({ "detail": "Access denied. Required roles: admin" })),
                )
            }),
        );
        let base = start_server(router).await;
        let session = admin_session();
        let gw = Gateway::new(base, Duration::from_secs(5), session.clone()).unwrap();

        let err = gw.send(gw.get("/api/users")).await.unwrap_err();
        assert!(matches!(err, ApiError::AuthExpired { status: 403, .. }));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn server_error_keeps_session_and_surfaces_detail() {
        let router = Router::new().route(
            "/boom",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    axum::Json(json!({ "detail": "Track not found" })),
                )
            }),
        );
        let base = start_server(router).await;
        let session = admin_session();
        let gw = Gateway::new(base, Duration::from_secs(5), session.clone()).unwrap();

        let err = gw.send(gw.get("/boom")).await.unwrap_err();
        assert_eq!(err.detail(), "Track not found");
        assert!(matches!(err, ApiError::Server { status: 404, .. }));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );
        let base = start_server(router).await;
        let gw = Gateway::new(base, Duration::from_millis(200), admin_session()).unwrap();

        let err = gw.send(gw.get("/slow")).await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout(d) if d == Duration::from_millis(200)));
    }

    #[test]
    fn detail_falls_back_to_raw_body() {
        assert_eq!(detail_from_body("Internal Server Error"), "Internal Server Error");
        assert_eq!(detail_from_body(r#"{"detail": "nope"}"#), "nope");
        assert_eq!(
            detail_from_body(r#"{"detail": [{"msg": "field required"}]}"#),
            r#"[{"msg":"field required"}]"#
        );
    }

    #[test]
    fn path_segment_rejects_separators() {
        assert_eq!(path_segment(" AB1 ").unwrap(), "AB1");
        assert!(path_segment("a/b").is_err());
        assert!(path_segment("a?b").is_err());
        assert!(path_segment("").is_err());
    }

    #[test]
    fn trims_trailing_slash() {
        let gw = Gateway::new(
            "http://localhost:8000/",
            Duration::from_secs(1),
            SessionContext::anonymous(),
        )
        .unwrap();
        assert_eq!(gw.base_url(), "http://localhost:8000");
        assert_eq!(gw.url("/health"), "http://localhost:8000/health");
    }
}
