pub mod admin;
pub mod scan;
pub mod session;
pub mod tracks;

use anyhow::Context;
use trackdesk_client::{AdminApi, ApiError, AuthApi, Gateway, ScannerApi, TrackRegistry};
use trackdesk_core::{Config, FileSessionStore, SessionContext, TrackStatus};

/// Per-invocation overrides from global flags.
#[derive(Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Resolved configuration plus the authenticated gateway built from it.
pub struct App {
    pub config: Config,
    pub gateway: Gateway,
}

impl App {
    pub fn open(overrides: &Overrides) -> anyhow::Result<Self> {
        let mut config = Config::load().context("loading config")?;
        if let Some(url) = &overrides.url {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = overrides.timeout_secs {
            config.timeout_secs = secs;
        }

        let session_path = config.session_path()?;
        let session = SessionContext::load(FileSessionStore::new(&session_path))
            .with_context(|| format!("loading session from {}", session_path.display()))?;
        let gateway = Gateway::from_config(&config, session)?;
        tracing::debug!(url = %config.base_url, timeout = config.timeout_secs, "gateway ready");
        Ok(Self { config, gateway })
    }

    pub fn session(&self) -> &SessionContext {
        self.gateway.session()
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.gateway.clone())
    }

    pub fn tracks(&self) -> TrackRegistry {
        TrackRegistry::new(self.gateway.clone())
    }

    pub fn scanner(&self) -> ScannerApi {
        ScannerApi::new(self.gateway.clone())
    }

    /// Admin endpoints. Refuses locally when the signed-in user is a client.
    pub fn admin(&self) -> anyhow::Result<AdminApi> {
        let session = self.session();
        if !session.is_authenticated() {
            return Err(ApiError::NotAuthenticated.into());
        }
        if !session.is_admin() {
            anyhow::bail!("this command needs an admin account");
        }
        Ok(AdminApi::new(self.gateway.clone()))
    }

    /// Personal code of the signed-in user.
    pub fn own_code(&self) -> anyhow::Result<String> {
        let user = self.session().user().ok_or(ApiError::NotAuthenticated)?;
        user.personal_code
            .ok_or_else(|| anyhow::anyhow!("account {} has no personal code", user.email))
    }
}

/// Parse a lifecycle status from a shorthand or a full label. Unknown labels are rejected.
pub fn parse_status(raw: &str) -> anyhow::Result<TrackStatus> {
    match TrackStatus::parse_arg(raw) {
        TrackStatus::Other(s) => {
            let known: Vec<&str> = TrackStatus::LIFECYCLE.iter().map(|t| t.label()).collect();
            anyhow::bail!(
                "unknown status {s:?}; use registered, left-origin, transit, almaty, astana, delivered, or one of: {}",
                known.join(" / ")
            )
        }
        status => Ok(status),
    }
}
