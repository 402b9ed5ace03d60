//! Session context: the bearer token and profile of the signed-in operator.
//!
//! A [`SessionContext`] is created once at startup and handed to every
//! component that talks to the backend. Clearing it (logout or an
//! authorization failure) is visible to all holders immediately and removes
//! the persisted copy.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
    #[serde(other)]
    Other,
}

/// Profile returned by the backend at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub personal_code: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub user: UserProfile,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Durable backing for a session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Credentials>, CoreError>;
    fn save(&self, credentials: &Credentials) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// JSON file store, one session per file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> CoreError {
        CoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Credentials>, CoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let content = serde_json::to_string_pretty(credentials)?;
        write_private(&self.path, content.as_bytes()).map_err(|e| self.io_err(e))
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

/// Write `content` readable by the owner only. The bearer token lives in here.
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}

/// In-process store; nothing survives the process.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Credentials>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(credentials: Credentials) -> Self {
        Self {
            slot: Mutex::new(Some(credentials)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Credentials>, CoreError> {
        Ok(self.slot.lock().map_err(|_| CoreError::Poisoned)?.clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CoreError> {
        *self.slot.lock().map_err(|_| CoreError::Poisoned)? = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.slot.lock().map_err(|_| CoreError::Poisoned)? = None;
        Ok(())
    }
}

struct Inner {
    store: Box<dyn SessionStore>,
    current: RwLock<Option<Credentials>>,
}

/// Shared, explicitly passed session state.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

impl SessionContext {
    /// Read any persisted session from `store`.
    pub fn load(store: impl SessionStore + 'static) -> Result<Self, CoreError> {
        let current = store.load()?;
        debug!(signed_in = current.is_some(), "session loaded");
        Ok(Self {
            inner: Arc::new(Inner {
                store: Box::new(store),
                current: RwLock::new(current),
            }),
        })
    }

    /// A session with nobody signed in and nothing persisted.
    pub fn anonymous() -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Box::new(MemorySessionStore::new()),
                current: RwLock::new(None),
            }),
        }
    }

    /// A session already holding `credentials`, kept in memory only.
    pub fn in_memory(credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Box::new(MemorySessionStore::with(credentials.clone())),
                current: RwLock::new(Some(credentials)),
            }),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|c| c.token.clone())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().as_ref().map(|c| c.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|c| c.user.role == Role::Admin)
    }

    /// Install fresh credentials and persist them.
    pub fn establish(&self, credentials: Credentials) -> Result<(), CoreError> {
        self.inner.store.save(&credentials)?;
        info!(email = %credentials.user.email, role = ?credentials.user.role, "session established");
        *self.write() = Some(credentials);
        Ok(())
    }

    /// Forget the session in memory and in the backing store.
    ///
    /// The in-memory copy is dropped even if the store fails, so no further
    /// request can carry the old token.
    pub fn clear(&self) -> Result<(), CoreError> {
        let had = self.write().take().is_some();
        if had {
            info!("session cleared");
        }
        self.inner.store.clear()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Credentials>> {
        self.inner
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Credentials>> {
        self.inner
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user", &self.user())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Credentials {
        Credentials {
            token: "jwt-abc".into(),
            user: UserProfile {
                id: Some(1),
                email: "ops@example.com".into(),
                name: "Ops".into(),
                personal_code: Some("1000".into()),
                role: Role::Admin,
                branch: None,
                whatsapp: None,
            },
        }
    }

    #[test]
    fn anonymous_has_no_token() {
        let s = SessionContext::anonymous();
        assert!(s.token().is_none());
        assert!(!s.is_authenticated());
        assert!(!s.is_admin());
    }

    #[test]
    fn clear_is_visible_to_every_clone() {
        let s = SessionContext::in_memory(admin());
        let other = s.clone();
        assert_eq!(other.token().as_deref(), Some("jwt-abc"));
        s.clear().unwrap();
        assert!(other.token().is_none());
    }

    #[test]
    fn file_store_persists_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let s = SessionContext::load(FileSessionStore::new(&path)).unwrap();
        assert!(!s.is_authenticated());
        s.establish(admin()).unwrap();
        assert!(path.exists());

        let reloaded = SessionContext::load(FileSessionStore::new(&path)).unwrap();
        assert!(reloaded.is_admin());
        assert_eq!(reloaded.user().unwrap().email, "ops@example.com");

        reloaded.clear().unwrap();
        assert!(!path.exists());
        // Clearing twice is fine.
        reloaded.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        // A pre-existing world-readable file is tightened on save.
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileSessionStore::new(&path).save(&admin()).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(FileSessionStore::new(&path).load().unwrap().is_some());
    }

    #[test]
    fn unknown_role_parses_as_other() {
        let json = r#"{"email": "a@b.c", "role": "courier"}"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Other);
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", admin());
        assert!(!rendered.contains("jwt-abc"));
    }
}
