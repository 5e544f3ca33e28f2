//! Auth token storage.
//!
//! The access token returned by `POST /login` is the only credential the
//! client holds. It is stored behind the [`TokenStore`] trait and handed to
//! [`crate::ApiClient`] explicitly; the client reads it on every request, so
//! removing it takes effect for the very next call.
//!
//! Implementations:
//!
//! 1. [`KeychainTokenStore`] - OS keychain, entry `contratos:session` / `access_token`
//! 2. [`MemoryTokenStore`] - process-local, for tests and `--token`
//! 3. [`EnvTokenStore`] - `CONTRATOS_TOKEN` overlaid on another store

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::KeychainError;
use crate::host::keychain::{KeychainApi, SystemKeychain, accounts, services};

/// Environment variable overriding the stored token.
pub const TOKEN_ENV: &str = "CONTRATOS_TOKEN";

// ============================================================================
// Token Store Trait
// ============================================================================

/// Persisted access token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the token, if one is stored. Empty tokens read as `None`.
    async fn get_token(&self) -> Result<Option<String>, KeychainError>;

    /// Stores a token, replacing any previous one.
    async fn set_token(&self, token: &str) -> Result<(), KeychainError>;

    /// Removes the token.
    async fn remove_token(&self) -> Result<(), KeychainError>;

    /// Returns true iff a non-empty token is stored.
    async fn is_authenticated(&self) -> bool {
        matches!(self.get_token().await, Ok(Some(_)))
    }
}

// ============================================================================
// Keychain Token Store
// ============================================================================

/// Token store backed by the system keychain.
#[derive(Clone)]
pub struct KeychainTokenStore {
    keychain: Arc<dyn KeychainApi>,
}

impl KeychainTokenStore {
    /// Creates a store using the system keychain.
    pub fn new() -> Self {
        Self::with_keychain(Arc::new(SystemKeychain::new()))
    }

    /// Creates a store using a custom keychain implementation.
    pub fn with_keychain(keychain: Arc<dyn KeychainApi>) -> Self {
        Self { keychain }
    }
}

impl Default for KeychainTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeychainTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeychainTokenStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenStore for KeychainTokenStore {
    async fn get_token(&self) -> Result<Option<String>, KeychainError> {
        let token = self
            .keychain
            .get(services::SESSION, accounts::ACCESS_TOKEN)
            .await?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    #[instrument(skip(self, token))]
    async fn set_token(&self, token: &str) -> Result<(), KeychainError> {
        self.keychain
            .set(services::SESSION, accounts::ACCESS_TOKEN, token)
            .await?;
        debug!("Access token saved to keychain");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_token(&self) -> Result<(), KeychainError> {
        self.keychain
            .delete(services::SESSION, accounts::ACCESS_TOKEN)
            .await?;
        debug!("Access token removed from keychain");
        Ok(())
    }
}

// ============================================================================
// Memory Token Store
// ============================================================================

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get_token(&self) -> Result<Option<String>, KeychainError> {
        Ok(self.token.read().await.clone().filter(|t| !t.is_empty()))
    }

    async fn set_token(&self, token: &str) -> Result<(), KeychainError> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn remove_token(&self) -> Result<(), KeychainError> {
        *self.token.write().await = None;
        Ok(())
    }
}

// ============================================================================
// Environment Overlay
// ============================================================================

/// Reads an override token from the environment before the inner store.
///
/// Writes go to the inner store. Removing the token also drops the
/// override for the rest of the process.
pub struct EnvTokenStore {
    inner: Arc<dyn TokenStore>,
    overlay: RwLock<Option<String>>,
}

impl EnvTokenStore {
    /// Wraps `inner`, reading the override from [`TOKEN_ENV`].
    pub fn from_env(inner: Arc<dyn TokenStore>) -> Self {
        let overlay = std::env::var(TOKEN_ENV).ok();
        Self::with_override(inner, overlay)
    }

    /// Wraps `inner` with an explicit override.
    pub fn with_override(inner: Arc<dyn TokenStore>, overlay: Option<String>) -> Self {
        Self {
            inner,
            overlay: RwLock::new(overlay.filter(|t| !t.is_empty())),
        }
    }
}

impl std::fmt::Debug for EnvTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvTokenStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenStore for EnvTokenStore {
    async fn get_token(&self) -> Result<Option<String>, KeychainError> {
        if let Some(token) = self.overlay.read().await.clone() {
            debug!(source = "env", "Using access token");
            return Ok(Some(token));
        }
        self.inner.get_token().await
    }

    async fn set_token(&self, token: &str) -> Result<(), KeychainError> {
        self.inner.set_token(token).await
    }

    async fn remove_token(&self) -> Result<(), KeychainError> {
        *self.overlay.write().await = None;
        self.inner.remove_token().await
    }
}

// ============================================================================
// Tests
// ============================================================================
