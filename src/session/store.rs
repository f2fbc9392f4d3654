//! Persistence of the session between runs
//!
//! The file store keeps a flat key/value JSON object, the same shape the
//! browser client kept in local storage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::User;

/// Key holding the access token
pub const TOKEN_KEY: &str = "access_token";
const REFRESH_KEY: &str = "refresh_token";
const USER_ID_KEY: &str = "user_id";
const USER_KEY: &str = "user";
const LOGGED_IN_KEY: &str = "isLoggedIn";

/// What survives between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<StoredSession>>;
    async fn save(&self, session: &StoredSession) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Session kept in a JSON file
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

    async fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<StoredSession>> {
        let mut entries = self.read_entries().await?;
        let access_token = match entries.remove(TOKEN_KEY) {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };
        let user = match entries.remove(USER_KEY) {
            Some(raw) => serde_json::from_str(&raw).ok(),
            None => None,
        };
        Ok(Some(StoredSession {
            access_token,
            refresh_token: entries.remove(REFRESH_KEY),
            user,
        }))
    }

    async fn save(&self, session: &StoredSession) -> Result<()> {
        let mut entries = BTreeMap::new();
        entries.insert(TOKEN_KEY.to_string(), session.access_token.clone());
        entries.insert(LOGGED_IN_KEY.to_string(), "true".to_string());
        if let Some(refresh) = &session.refresh_token {
            entries.insert(REFRESH_KEY.to_string(), refresh.clone());
        }
        if let Some(user) = &session.user {
            entries.insert(USER_ID_KEY.to_string(), user.id.to_string());
            entries.insert(USER_KEY.to_string(), serde_json::to_string(user)?);
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(&entries)?).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Session that lives as long as the process
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    async fn save(&self, session: &StoredSession) -> Result<()> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;

    fn sample_user() -> User {
        User {
            id: 42,
            email: "ana@example.com".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            category: Role::Artist,
            phone: None,
            profile_picture: None,
            artistic_nickname: Some("Azul".to_string()),
        }
    }

    #[tokio::test]
    async fn file_store_keeps_local_storage_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileSessionStore::new(&path);

        assert_eq!(store.load().await.unwrap(), None);

        let session = StoredSession {
            access_token: "tok".to_string(),
            refresh_token: Some("ref".to_string()),
            user: Some(sample_user()),
        };
        store.save(&session).await.unwrap();

        let raw: BTreeMap<String, String> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw.get(TOKEN_KEY).map(String::as_str), Some("tok"));
        assert_eq!(raw.get("user_id").map(String::as_str), Some("42"));
        assert_eq!(raw.get("isLoggedIn").map(String::as_str), Some("true"));

        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemorySessionStore::new();
        let session = StoredSession {
            access_token: "abc".to_string(),
            refresh_token: None,
            user: None,
        };
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().access_token, "abc");
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
