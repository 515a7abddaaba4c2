//! Authentication backend trait.

use async_trait::async_trait;

use super::model::{LoginResponse, User};
use crate::error::Result;

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `POST /auth/login`. Does not touch the token store.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse>;

    /// `POST /auth/register`.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<User>;
}
