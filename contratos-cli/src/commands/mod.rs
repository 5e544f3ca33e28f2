//! CLI command implementations.

pub mod auth;
pub mod config;
pub mod list;
pub mod upload;

use std::sync::Arc;

use anyhow::Result;
use contratos_fetch::{
    ApiClient, EnvTokenStore, KeychainTokenStore, MemoryTokenStore, TokenStore, resolve_base_url,
};
use contratos_store::{Settings, SettingsStore};
use tracing::debug;

use crate::{Cli, CliError};

/// Everything a command needs to talk to the API.
pub struct AppContext {
    /// Configured client.
    pub client: Arc<ApiClient>,
    /// Loaded settings.
    pub settings: Settings,
}

impl AppContext {
    /// Builds the client from flags, environment and settings.
    pub async fn connect(cli: &Cli) -> Result<Self> {
        let settings = SettingsStore::load_default().await?.get().await;
        let base_url = resolve_base_url(cli.api_url.as_deref(), settings.api_url.as_deref())?;

        let tokens: Arc<dyn TokenStore> = match &cli.token {
            Some(token) => Arc::new(MemoryTokenStore::with_token(token.clone())),
            None => Arc::new(EnvTokenStore::from_env(Arc::new(KeychainTokenStore::new()))),
        };

        debug!(base_url = %base_url, timeout = settings.timeout_secs, "Connecting");
        let client = ApiClient::builder()
            .base_url(base_url)
            .timeout(settings.timeout())
            .tokens(tokens)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            settings,
        })
    }

    /// Fails with [`CliError::NotAuthenticated`] unless a token is stored.
    pub async fn require_auth(&self) -> Result<()> {
        if self.client.tokens().is_authenticated().await {
            Ok(())
        } else {
            Err(CliError::NotAuthenticated.into())
        }
    }
}
