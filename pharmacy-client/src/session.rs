//! Session persistence
//!
//! The session is a bearer token plus the cached [`UserRecord`], stored
//! under two fixed keys. Reads never fail: missing entries are `None`, and
//! a corrupt user entry is purged and reported as `None` so a damaged
//! store heals itself on the next read.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shared::UserRecord;

use crate::error::{ClientError, ClientResult};

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "token";
/// Storage key for the cached user record (JSON)
pub const USER_KEY: &str = "user";

/// Key/value persistence backing a [`SessionStore`]
pub trait SessionStorage: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// One file per key under a directory
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

impl SessionStorage for FileStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-process storage; contents die with the client
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Authenticated identity held by the running client
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

/// Token and user record store
///
/// Mutation takes `&mut self`: the owning client is the single writer.
#[derive(Debug)]
pub struct SessionStore<S: SessionStorage> {
    storage: S,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Persist a session.
    ///
    /// Any previous token is dropped first and the new user is written before
    /// the new token, so a reader never pairs one identity with another's
    /// token. If the token write fails the user entry is rolled back.
    pub fn save(&mut self, token: &str, user: &UserRecord) -> ClientResult<()> {
        if token.trim().is_empty() {
            return Err(ClientError::Auth("Cannot store an empty token".into()));
        }
        user.validate()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let json = serde_json::to_string(user)?;
        self.storage.remove(TOKEN_KEY)?;
        self.storage.write(USER_KEY, &json)?;
        if let Err(e) = self.storage.write(TOKEN_KEY, token) {
            if let Err(rollback) = self.storage.remove(USER_KEY) {
                tracing::warn!(error = %rollback, "Failed to roll back user entry");
            }
            return Err(e.into());
        }
        tracing::debug!(user_id = user.id, "Session saved");
        Ok(())
    }

    /// Remove both token and user.
    pub fn clear(&mut self) -> ClientResult<()> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        tracing::debug!("Session cleared");
        Ok(())
    }

    /// Stored bearer token, if any
    pub fn token(&self) -> Option<String> {
        match self.storage.read(TOKEN_KEY) {
            Ok(Some(token)) if !token.trim().is_empty() => Some(token.trim().to_string()),
            Ok(Some(_)) => {
                self.purge(TOKEN_KEY, "empty token");
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }

    /// Cached user record, if present and structurally valid
    pub fn user(&self) -> Option<UserRecord> {
        let raw = match self.storage.read(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored user");
                return None;
            }
        };

        let user = match serde_json::from_str::<UserRecord>(&raw) {
            Ok(user) => user,
            Err(e) => {
                self.purge(USER_KEY, &e.to_string());
                return None;
            }
        };

        match user.validate() {
            Ok(()) => Some(user),
            Err(e) => {
                self.purge(USER_KEY, &e.to_string());
                None
            }
        }
    }

    /// Token and user together, or `None` if either is missing
    pub fn snapshot(&self) -> Option<Session> {
        let user = self.user()?;
        let token = self.token()?;
        Some(Session { token, user })
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_some()
    }

    fn purge(&self, key: &str, reason: &str) {
        tracing::warn!(key, reason, "Discarding corrupt session entry");
        if let Err(e) = self.storage.remove(key) {
            tracing::warn!(key, error = %e, "Failed to remove corrupt session entry");
        }
    }
}
