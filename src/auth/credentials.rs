use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::config::ClientConfig;
use crate::models::UserRecord;
use crate::storage::{self, FileStorage, KeyValueStorage, MemoryStorage};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

const ALL_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

/// Which backend a value lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Survives restarts ("remember me")
    Persistent,
    /// Scoped to the current session
    Session,
}

impl StorageKind {
    pub fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            StorageKind::Persistent
        } else {
            StorageKind::Session
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Persistent => "persistent",
            StorageKind::Session => "session",
        }
    }
}

/// Sole owner of the access token, refresh token and cached user.
///
/// Reads check the persistent backend first, then the session-scoped one.
/// A missing backend reads as empty and swallows writes; backend failures are
/// logged and treated the same way, so no method here returns an error.
#[derive(Clone)]
pub struct CredentialStore {
    persistent: Option<Arc<dyn KeyValueStorage>>,
    session: Option<Arc<dyn KeyValueStorage>>,
}

impl CredentialStore {
    pub fn new(
        persistent: Option<Arc<dyn KeyValueStorage>>,
        session: Option<Arc<dyn KeyValueStorage>>,
    ) -> Self {
        Self { persistent, session }
    }

    /// Both backends in memory
    pub fn in_memory() -> Self {
        Self::new(
            Some(Arc::new(MemoryStorage::new())),
            Some(Arc::new(MemoryStorage::new())),
        )
    }

    /// No storage at all: reads are empty, writes are dropped
    pub fn unavailable() -> Self {
        Self::new(None, None)
    }

    /// File-backed store at the configured locations
    pub fn from_config(config: &ClientConfig) -> Self {
        let persistent = storage::persistent_path(config.storage.config_dir.as_deref())
            .map(|path| Arc::new(FileStorage::new(path)) as Arc<dyn KeyValueStorage>);
        if persistent.is_none() {
            warn!("no config directory available, remember-me logins will not persist");
        }

        let session_path = storage::session_path(config.storage.session_dir.as_deref());
        let session = Some(Arc::new(FileStorage::new(session_path)) as Arc<dyn KeyValueStorage>);

        Self::new(persistent, session)
    }

    fn backend(&self, kind: StorageKind) -> Option<&Arc<dyn KeyValueStorage>> {
        match kind {
            StorageKind::Persistent => self.persistent.as_ref(),
            StorageKind::Session => self.session.as_ref(),
        }
    }

    fn get_from(&self, kind: StorageKind, key: &str) -> Option<String> {
        let backend = self.backend(kind)?;
        match backend.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(backend = kind.as_str(), key, "credential read failed: {}", e);
                None
            }
        }
    }

    fn set_in(&self, kind: StorageKind, key: &str, value: &str) {
        if let Some(backend) = self.backend(kind) {
            if let Err(e) = backend.set(key, value) {
                warn!(backend = kind.as_str(), key, "credential write failed: {}", e);
            }
        }
    }

    fn remove_from(&self, kind: StorageKind, key: &str) {
        if let Some(backend) = self.backend(kind) {
            if let Err(e) = backend.remove(key) {
                warn!(backend = kind.as_str(), key, "credential removal failed: {}", e);
            }
        }
    }

    /// Write all three values to exactly one backend
    pub fn save(
        &self,
        access_token: &str,
        refresh_token: &str,
        user: &UserRecord,
        persistent: bool,
    ) {
        let kind = StorageKind::from_remember_me(persistent);
        let user_json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize user for storage: {}", e);
                return;
            }
        };

        self.set_in(kind, ACCESS_TOKEN_KEY, access_token);
        self.set_in(kind, REFRESH_TOKEN_KEY, refresh_token);
        self.set_in(kind, USER_KEY, &user_json);
    }

    /// Persistent value if present, else session-scoped, else None
    pub fn read(&self, key: &str) -> Option<String> {
        self.get_from(StorageKind::Persistent, key)
            .or_else(|| self.get_from(StorageKind::Session, key))
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Cached user; undecodable JSON reads as absent
    pub fn user(&self) -> Option<UserRecord> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("stored user record is not valid JSON: {}", e);
                None
            }
        }
    }

    /// A user and an access token are both stored
    pub fn has_session(&self) -> bool {
        self.user().is_some() && self.access_token().is_some()
    }

    /// Backend the active session was written to.
    ///
    /// Decided by whichever backend holds the refresh token, falling back to
    /// the access token; persistent wins when both hold one.
    pub fn origin(&self) -> Option<StorageKind> {
        [REFRESH_TOKEN_KEY, ACCESS_TOKEN_KEY].iter().find_map(|key| {
            [StorageKind::Persistent, StorageKind::Session]
                .into_iter()
                .find(|kind| self.get_from(*kind, key).is_some())
        })
    }

    /// Write refreshed tokens back to the backend of origin.
    ///
    /// Returns the backend written to, or None when no session is stored.
    pub fn update_access_token(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Option<StorageKind> {
        let kind = self.origin()?;
        self.set_in(kind, ACCESS_TOKEN_KEY, access_token);
        if let Some(refresh) = refresh_token {
            self.set_in(kind, REFRESH_TOKEN_KEY, refresh);
        }
        Some(kind)
    }

    /// Replace the cached user in the backend of origin
    pub fn update_user(&self, user: &UserRecord) -> Option<StorageKind> {
        let kind = self.origin()?;
        match serde_json::to_string(user) {
            Ok(json) => self.set_in(kind, USER_KEY, &json),
            Err(e) => warn!("failed to serialize user for storage: {}", e),
        }
        Some(kind)
    }

    /// Remove every key from both backends
    pub fn clear(&self) {
        for kind in [StorageKind::Persistent, StorageKind::Session] {
            for key in ALL_KEYS {
                self.remove_from(kind, key);
            }
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("persistent", &self.persistent.is_some())
            .field("session", &self.session.is_some())
            .finish()
    }
}
