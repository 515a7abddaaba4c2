//! Token/user store trait.

use async_trait::async_trait;

use super::model::User;
use crate::error::Result;

/// Key under which the access token is persisted.
pub const TOKEN_KEY: &str = "@token";
/// Key under which the user profile (JSON) is persisted.
pub const USER_KEY: &str = "@user";

/// Local cache for the authentication token and the logged-in user.
///
/// Written on login, read on start-up, cleared on logout and whenever the
/// backend answers 401.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn save_token(&self, token: &str) -> Result<()>;

    async fn token(&self) -> Result<Option<String>>;

    async fn save_user(&self, user: &User) -> Result<()>;

    async fn user(&self) -> Result<Option<User>>;

    /// Removes token and user together.
    async fn clear(&self) -> Result<()>;
}
