//! File-backed token store.

use async_trait::async_trait;
use higia_core::auth::{TOKEN_KEY, TokenStore, USER_KEY, User};
use higia_core::{HigiaError, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::paths::HigiaPaths;
use crate::storage::{AtomicFile, FileFormat};

type Entries = BTreeMap<String, String>;

/// Persists token and user in a small JSON key-value file.
///
/// File IO runs on the blocking pool; every write holds the file's exclusive
/// lock so concurrent writers never interleave.
#[derive(Clone)]
pub struct FileTokenStore {
    file: AtomicFile<Entries>,
}

impl FileTokenStore {
    /// Store at the default location (`session.json` in the config dir).
    pub fn new(paths: &HigiaPaths) -> Result<Self> {
        Ok(Self::with_path(paths.session_file()?))
    }

    /// Store at a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path, FileFormat::Json).private(),
        }
    }

    /// An unreadable file reads as empty so a later login or logout can
    /// overwrite it.
    async fn read(&self, key: &'static str) -> Result<Option<String>> {
        let file = self.file.clone();
        blocking(move || match file.load() {
            Ok(entries) => Ok(entries.and_then(|mut entries| entries.remove(key))),
            Err(err @ HigiaError::Serialization { .. }) => {
                tracing::warn!(path = %file.path().display(), error = %err, "Stored session is unreadable; treating it as empty");
                Ok(None)
            }
            Err(err) => Err(err),
        })
        .await
    }

    async fn write<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Entries) + Send + 'static,
    {
        let file = self.file.clone();
        blocking(move || file.update_or_reset(Entries::new(), f)).await
    }
}

async fn blocking<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| HigiaError::internal(format!("Token store task failed: {e}")))?
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn save_token(&self, token: &str) -> Result<()> {
        let token = token.to_string();
        self.write(move |entries| {
            entries.insert(TOKEN_KEY.to_string(), token);
        })
        .await
    }

    async fn token(&self) -> Result<Option<String>> {
        self.read(TOKEN_KEY).await
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.write(move |entries| {
            entries.insert(USER_KEY.to_string(), json);
        })
        .await
    }

    async fn user(&self) -> Result<Option<User>> {
        match self.read(USER_KEY).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn clear(&self) -> Result<()> {
        let file = self.file.clone();
        blocking(move || file.replace(&Entries::new())).await?;
        tracing::debug!(path = %self.file.path().display(), "Cleared stored token and user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ana() -> User {
        User {
            id: "u1".into(),
            name: "Ana".into(),
            email: "ana@x.com".into(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTokenStore::with_path(temp_dir.path().join("session.json"));

        assert_eq!(store.token().await.unwrap(), None);
        assert_eq!(store.user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_and_reload_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        let store = FileTokenStore::with_path(path.clone());
        store.save_token("tok-1").await.unwrap();
        store.save_user(&ana()).await.unwrap();

        // A fresh handle sees what the first one wrote (app resume).
        let reopened = FileTokenStore::with_path(path.clone());
        assert_eq!(reopened.token().await.unwrap().as_deref(), Some("tok-1"));
        assert_eq!(reopened.user().await.unwrap(), Some(ana()));

        // Fixed keys on disk.
        let raw: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.contains_key("@token"));
        assert!(raw.contains_key("@user"));
    }

    #[tokio::test]
    async fn test_clear_removes_token_and_user_together() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTokenStore::with_path(temp_dir.path().join("session.json"));
        store.save_token("tok-1").await.unwrap();
        store.save_user(&ana()).await.unwrap();

        store.clear().await.unwrap();

        assert_eq!(store.token().await.unwrap(), None);
        assert_eq!(store.user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_truncated_file_does_not_lock_the_user_out() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, r#"{"@token": "tok"#).unwrap();
        let store = FileTokenStore::with_path(path);

        assert_eq!(store.token().await.unwrap(), None);
        assert_eq!(store.user().await.unwrap(), None);

        store.clear().await.unwrap();
        assert_eq!(store.token().await.unwrap(), None);

        std::fs::write(store.file.path(), "{\"@user\": ").unwrap();
        store.save_token("tok-2").await.unwrap();
        assert_eq!(store.token().await.unwrap().as_deref(), Some("tok-2"));
    }

    #[tokio::test]
    async fn test_corrupt_user_entry_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, r#"{"@user": "not a user"}"#).unwrap();

        let store = FileTokenStore::with_path(path);
        assert!(store.user().await.is_err());
    }
}
