//! Login, registration and the locally remembered session.

use higia_core::auth::{AuthBackend, TokenStore, User};
use higia_core::{HigiaError, Result};
use std::sync::Arc;

use crate::messages;

/// Drives the auth endpoints and keeps the token store in step with them.
#[derive(Clone)]
pub struct AuthService {
    backend: Arc<dyn AuthBackend>,
    store: Arc<dyn TokenStore>,
}

impl AuthService {
    pub fn new(backend: Arc<dyn AuthBackend>, store: Arc<dyn TokenStore>) -> Self {
        Self { backend, store }
    }

    /// Logs in and remembers the token and user.
    ///
    /// Blank fields are rejected before any request. Show failures with
    /// `messages::LOGIN_FAILED` as fallback.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() || password.trim().is_empty() {
            return Err(HigiaError::validation(messages::FILL_ALL_FIELDS));
        }

        let response = self.backend.login(email, password).await.map_err(|err| {
            tracing::warn!(error = %err, "Login failed");
            err
        })?;

        self.store.save_token(&response.access_token).await?;
        self.store.save_user(&response.user).await?;
        tracing::info!(user_id = %response.user.id, "Logged in");

        Ok(response.user)
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let (name, email) = (name.trim(), email.trim());
        if name.is_empty() || email.is_empty() || password.trim().is_empty() {
            return Err(HigiaError::validation(messages::FILL_ALL_FIELDS));
        }

        let user = self.backend.register(name, email, password).await?;
        tracing::info!(user_id = %user.id, "Account registered");
        Ok(user)
    }

    /// Forgets the stored token and user.
    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// The user remembered from a previous login, when a token is stored too.
    pub async fn restore(&self) -> Result<Option<User>> {
        if self.store.token().await?.is_none() {
            return Ok(None);
        }
        let user = self.store.user().await?;
        if let Some(user) = &user {
            tracing::debug!(user_id = %user.id, "Restored stored session");
        }
        Ok(user)
    }

    pub async fn is_logged_in(&self) -> Result<bool> {
        Ok(self.restore().await?.is_some())
    }
}
