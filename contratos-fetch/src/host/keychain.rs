//! Secure credential storage using the system keychain.
//!
//! This module provides access to the system's secure credential storage:
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: kernel keyutils

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use crate::error::KeychainError;

/// Service name prefix for `contratos` credentials.
const SERVICE_PREFIX: &str = "contratos";

// ============================================================================
// Keychain API Trait
// ============================================================================

/// API for secure credential storage.
#[async_trait]
pub trait KeychainApi: Send + Sync {
    /// Get a credential from the keychain.
    ///
    /// # Returns
    /// * `Ok(Some(secret))` - Credential found
    /// * `Ok(None)` - Credential not found
    /// * `Err(e)` - Error accessing keychain
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError>;

    /// Set a credential in the keychain.
    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError>;

    /// Delete a credential from the keychain. Deleting a missing entry is not an error.
    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError>;

    /// Check if a credential exists.
    async fn exists(&self, service: &str, account: &str) -> bool {
        matches!(self.get(service, account).await, Ok(Some(_)))
    }
}

// ============================================================================
// System Keychain Implementation
// ============================================================================

/// Default implementation using the system keychain through `keyring`.
#[derive(Debug, Clone, Default)]
pub struct SystemKeychain;

impl SystemKeychain {
    /// Creates a new system keychain instance.
    pub fn new() -> Self {
        Self
    }

    /// Builds the full service name with prefix.
    fn full_service(service: &str) -> String {
        format!("{SERVICE_PREFIX}:{service}")
    }

    /// Creates a keyring entry.
    fn entry(service: &str, account: &str) -> keyring::Result<Entry> {
        Entry::new(&Self::full_service(service), account)
    }
}

/// Runs a keyring call on the blocking pool. Platform backends make
/// synchronous IPC or syscalls.
async fn run_blocking<T, F>(call: F) -> Result<keyring::Result<T>, KeychainError>
where
    F: FnOnce() -> keyring::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| KeychainError::Other(format!("keychain task failed: {e}")))
}

#[async_trait]
impl KeychainApi for SystemKeychain {
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError> {
        debug!(service = %service, account = %account, "Getting credential from keychain");

        let (svc, acct) = (service.to_owned(), account.to_owned());
        match run_blocking(move || Self::entry(&svc, &acct)?.get_password()).await? {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => {
                debug!(service = %service, account = %account, "Credential not found");
                Ok(None)
            }
            Err(e) => {
                warn!(service = %service, account = %account, error = %e, "Failed to get credential");
                Err(e.into())
            }
        }
    }

    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
        debug!(service = %service, account = %account, "Setting credential in keychain");

        let (svc, acct, secret) = (service.to_owned(), account.to_owned(), secret.to_owned());
        run_blocking(move || Self::entry(&svc, &acct)?.set_password(&secret))
            .await?
            .map_err(|e| {
                warn!(service = %service, account = %account, error = %e, "Failed to set credential");
                KeychainError::from(e)
            })
    }

    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError> {
        debug!(service = %service, account = %account, "Deleting credential from keychain");

        let (svc, acct) = (service.to_owned(), account.to_owned());
        match run_blocking(move || Self::entry(&svc, &acct)?.delete_credential()).await? {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                warn!(service = %service, account = %account, error = %e, "Failed to delete credential");
                Err(e.into())
            }
        }
    }
}

// ============================================================================
// Credential Keys
// ============================================================================

/// Service names.
pub mod services {
    /// Dashboard session.
    pub const SESSION: &str = "session";
}

/// Account names.
pub mod accounts {
    /// Bearer access token.
    pub const ACCESS_TOKEN: &str = "access_token";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_service_name() {
        assert_eq!(
            SystemKeychain::full_service(services::SESSION),
            "contratos:session"
        );
    }

    #[tokio::test]
    async fn test_run_blocking_returns_call_result() {
        let found = run_blocking(|| Ok("tok".to_string())).await.unwrap();
        assert_eq!(found.unwrap(), "tok");

        let missing = run_blocking(|| Err::<String, _>(keyring::Error::NoEntry))
            .await
            .unwrap();
        assert!(matches!(missing, Err(keyring::Error::NoEntry)));
    }

    #[tokio::test]
    async fn test_run_blocking_reports_failed_task() {
        let err = run_blocking::<(), _>(|| panic!("backend crashed"))
            .await
            .unwrap_err();
        assert!(matches!(err, KeychainError::Other(msg) if msg.starts_with("keychain task failed")));
    }
}
