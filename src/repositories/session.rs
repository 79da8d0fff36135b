use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    error::{AppError, Result},
    models::{
        session::{AccessToken, Session},
        user::{User, UserPatch},
    },
};

/// Key of the persisted bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key of the persisted user record.
pub const USER_KEY: &str = "user";

/// Durable string storage keyed by name.
pub trait StorageBackend: Send + Sync {
    /// Reads an entry. A missing entry is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Writes an entry, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removes an entry. Removing a missing entry is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Stores each entry as one file inside a directory.
///
/// Uses blocking `std::fs`: entries are a few hundred bytes and are read
/// inline on the calling task.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a crash never leaves a half-written entry.
        let tmp = self.path(&format!(".{}.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps entries in memory; used under test and for throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// The single source of truth for "is a user currently authenticated".
///
/// The token and the user record live under two independent keys but are
/// only ever written and cleared together.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn StorageBackend>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// A store backed by files in `dir`.
    pub fn on_disk(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStorage::new(dir)))
    }

    /// A store that forgets everything when dropped.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Reads the persisted session.
    ///
    /// A token without a parsable user record (or the reverse) is invalid
    /// state: both entries are cleared and `None` is returned.
    pub fn restore(&self) -> Result<Option<Session>> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user = self.storage.get(USER_KEY)?;

        match (token, user) {
            (None, None) => Ok(None),
            (Some(token), Some(raw_user)) => match sonic_rs::from_str::<User>(&raw_user) {
                Ok(user) if !token.trim().is_empty() => Ok(Some(Session {
                    token: AccessToken::new(token.trim()),
                    user,
                })),
                Ok(_) => self.force_logout("empty token"),
                Err(e) => self.force_logout(&format!("unparsable user record: {}", e)),
            },
            (Some(_), None) => self.force_logout("token without user record"),
            (None, Some(_)) => self.force_logout("user record without token"),
        }
    }

    /// Persists both entries. If the second write fails the first is rolled
    /// back, so callers never observe half a session.
    pub fn save(&self, session: &Session) -> Result<()> {
        let user_json = sonic_rs::to_string(&session.user)?;

        self.storage.set(USER_KEY, &user_json)?;
        if let Err(e) = self.storage.set(TOKEN_KEY, session.token.as_str()) {
            if let Err(rollback) = self.storage.remove(USER_KEY) {
                tracing::error!("❌ Failed to roll back user record: {}", rollback);
            }
            return Err(e);
        }

        tracing::debug!("💾 Session saved for {}", session.user.username);
        Ok(())
    }

    /// Removes both persisted entries.
    pub fn clear(&self) -> Result<()> {
        let token_result = self.storage.remove(TOKEN_KEY);
        let user_result = self.storage.remove(USER_KEY);
        token_result.and(user_result)?;
        tracing::debug!("🧹 Session cleared");
        Ok(())
    }

    /// Merges fields into the cached user and re-persists it.
    ///
    /// Fails with `AppError::State` when no session is present.
    pub fn update_user(&self, patch: UserPatch) -> Result<User> {
        let mut session = self
            .restore()?
            .ok_or_else(|| AppError::State("no active session".to_string()))?;
        session.user.apply(patch);
        self.storage
            .set(USER_KEY, &sonic_rs::to_string(&session.user)?)?;
        Ok(session.user)
    }

    /// Whether a usable session is persisted.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.restore()?.is_some())
    }

    fn force_logout(&self, reason: &str) -> Result<Option<Session>> {
        tracing::warn!("⚠️ Discarding persisted session: {}", reason);
        self.clear()?;
        Ok(None)
    }
}
