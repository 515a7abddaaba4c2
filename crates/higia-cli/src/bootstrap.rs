//! Wires configuration, storage and the backend client into the services the
//! commands use.

use anyhow::{Context, Result};
use higia_application::{AuthService, HomeService, IdentificationService};
use higia_core::auth::TokenStore;
use higia_core::clock::{Clock, SystemClock};
use higia_core::config::RootConfig;
use higia_infrastructure::config_service::validate;
use higia_infrastructure::{ConfigService, FileTokenStore, HigiaPaths, MemoryTokenStore};
use higia_interaction::HttpBackendClient;
use std::sync::Arc;

use crate::GlobalArgs;

pub struct App {
    pub config: RootConfig,
    pub backend: Arc<HttpBackendClient>,
    pub clock: Arc<dyn Clock>,
    pub auth: AuthService,
    pub identification: IdentificationService,
    pub home: HomeService,
}

impl App {
    pub fn bootstrap(global: &GlobalArgs) -> Result<Self> {
        let paths = HigiaPaths::new(global.config_dir.clone());
        let config = effective_config(global, &paths)?;

        let store: Arc<dyn TokenStore> = if global.ephemeral {
            Arc::new(MemoryTokenStore::new())
        } else {
            Arc::new(FileTokenStore::new(&paths).context("Failed to locate session file")?)
        };

        let backend = Arc::new(
            HttpBackendClient::new(&config.api, store.clone())
                .context("Failed to create backend client")?,
        );
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        tracing::debug!(
            base_url = %backend.base_url(),
            timeout_ms = config.api.timeout_ms,
            ephemeral = global.ephemeral,
            "Bootstrapped"
        );

        Ok(Self {
            auth: AuthService::new(backend.clone(), store.clone()),
            identification: IdentificationService::new(backend.clone(), clock.clone()),
            home: HomeService::new(backend.clone(), store, clock.clone()),
            config,
            backend,
            clock,
        })
    }
}

pub fn config_service(global: &GlobalArgs) -> Result<ConfigService> {
    let paths = HigiaPaths::new(global.config_dir.clone());
    ConfigService::new(&paths).context("Failed to locate config file")
}

/// config.toml, then the environment, then `--api-url`.
pub fn effective_config(global: &GlobalArgs, paths: &HigiaPaths) -> Result<RootConfig> {
    let service = ConfigService::new(paths).context("Failed to locate config file")?;
    let mut config = service
        .get_config()
        .with_context(|| format!("Failed to load {}", service.path().display()))?;

    if let Some(url) = global.api_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        config.api.base_url = url.to_string();
        validate(&config).context("Invalid --api-url")?;
    }

    Ok(config)
}
