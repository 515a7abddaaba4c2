//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` and layers environment
//! overrides on top.

use crate::paths::HigiaPaths;
use crate::storage::{AtomicFile, FileFormat};
use higia_core::config::RootConfig;
use higia_core::{HigiaError, Result};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

pub const ENV_API_URL: &str = "HIGIA_API_URL";
pub const ENV_API_TIMEOUT_MS: &str = "HIGIA_API_TIMEOUT_MS";

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicFile<RootConfig>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &HigiaPaths) -> Result<Self> {
        Ok(Self::with_path(paths.config_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path, FileFormat::Toml),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Gets the configuration with environment overrides applied, loading
    /// from file if not cached. A missing file yields the defaults.
    pub fn get_config(&self) -> Result<RootConfig> {
        if let Some(cached) = self.read_cache() {
            return Ok(cached);
        }

        let from_file = self.file.load()?.unwrap_or_default();
        let config = apply_overrides(from_file, |key| std::env::var(key).ok())?;
        validate(&config)?;

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(config.clone());
        }

        Ok(config)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    /// Writes a default `config.toml` unless one exists.
    ///
    /// Returns `true` when a file was created.
    pub fn init(&self) -> Result<bool> {
        if self.file.path().exists() {
            return Ok(false);
        }
        self.file.save(&RootConfig::default())?;
        tracing::info!(path = %self.file.path().display(), "Wrote default configuration");
        Ok(true)
    }

    fn read_cache(&self) -> Option<RootConfig> {
        self.config.read().ok().and_then(|guard| guard.clone())
    }
}

/// Layers `HIGIA_API_URL` / `HIGIA_API_TIMEOUT_MS` over `config`.
pub fn apply_overrides<F>(mut config: RootConfig, lookup: F) -> Result<RootConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api.base_url = url.trim().to_string();
    }
    if let Some(raw) = lookup(ENV_API_TIMEOUT_MS) {
        config.api.timeout_ms = raw.trim().parse().map_err(|_| {
            HigiaError::config(format!("{ENV_API_TIMEOUT_MS} must be a number, got '{raw}'"))
        })?;
    }
    Ok(config)
}

/// Rejects configurations the HTTP client cannot use.
pub fn validate(config: &RootConfig) -> Result<()> {
    let url = &config.api.base_url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(HigiaError::config(format!(
            "api.base_url must start with http:// or https://, got '{url}'"
        )));
    }
    if config.api.timeout_ms == 0 {
        return Err(HigiaError::config("api.timeout_ms must be greater than zero"));
    }
    Ok(())
}
