//! Authentication domain module.
//!
//! # Module Structure
//!
//! - `model`: `User`, `LoginResponse`
//! - `store`: local token/user cache (`TokenStore`)
//! - `backend`: login and registration calls (`AuthBackend`)

mod backend;
mod model;
mod store;

pub use backend::AuthBackend;
pub use model::{LoginResponse, User};
pub use store::{TOKEN_KEY, TokenStore, USER_KEY};
