//! In-memory token store.

use async_trait::async_trait;
use higia_core::Result;
use higia_core::auth::{TOKEN_KEY, TokenStore, USER_KEY, User};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keeps token and user for the lifetime of the process only.
///
/// Used with `--ephemeral` and as the default store in tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<&'static str, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save_token(&self, token: &str) -> Result<()> {
        self.entries.write().await.insert(TOKEN_KEY, token.to_string());
        Ok(())
    }

    async fn token(&self) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(TOKEN_KEY).cloned())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.entries.write().await.insert(USER_KEY, json);
        Ok(())
    }

    async fn user(&self) -> Result<Option<User>> {
        match self.entries.read().await.get(USER_KEY) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(TOKEN_KEY);
        entries.remove(USER_KEY);
        Ok(())
    }
}
