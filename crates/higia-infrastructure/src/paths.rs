//! Unified path management for higia configuration files.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for higia_core::HigiaError {
    fn from(err: PathError) -> Self {
        higia_core::HigiaError::config(err.to_string())
    }
}

/// Path layout for higia.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/higia/             # Config directory (or the override root)
/// ├── config.toml              # Backend URL and timeout
/// └── session.json             # Stored token and user (0600 on unix)
/// ```
#[derive(Debug, Clone, Default)]
pub struct HigiaPaths {
    root: Option<PathBuf>,
}

impl HigiaPaths {
    /// `root` replaces the platform config directory when given.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Returns the higia configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join("higia"))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Returns the path to config.toml.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the token/user store.
    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("session.json"))
    }
}
