//! Local persistence and configuration for the Higia client.

pub mod config_service;
pub mod paths;
pub mod storage;
pub mod token_store;

pub use crate::config_service::ConfigService;
pub use crate::paths::HigiaPaths;
pub use crate::token_store::{FileTokenStore, MemoryTokenStore};
