//! Fetch error types.

use contratos_core::ApiError;
use thiserror::Error;

/// Message shown when no response was received.
pub const NETWORK_MESSAGE: &str = "Falha de comunicação com o servidor";

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for API calls.
///
/// Cloneable so the cache layer can keep the last error of a query next to
/// its last data.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// A success response whose body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid base URL or endpoint.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The credential store could not be read.
    #[error("Credential error: {0}")]
    Credentials(String),
}

impl FetchError {
    /// Returns the structured API error, if the server sent one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true for a 401 response.
    pub fn is_unauthorized(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_unauthorized)
    }

    /// Returns true if no response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
    }

    /// Message suitable for an end user: the server's message for API
    /// errors, [`NETWORK_MESSAGE`] when no response arrived.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.message.clone(),
            Self::Network(_) | Self::Timeout => NETWORK_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_builder() {
            FetchError::InvalidRequest(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<KeychainError> for FetchError {
    fn from(err: KeychainError) -> Self {
        FetchError::Credentials(err.to_string())
    }
}

// ============================================================================
// Keychain Error
// ============================================================================

/// Error type for keychain operations.
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Credential not found.
    #[error("Credential not found for {service}/{account}")]
    NotFound {
        /// Service name.
        service: String,
        /// Account name.
        account: String,
    },

    /// Access denied.
    #[error("Access denied to keychain")]
    AccessDenied,

    /// Platform error.
    #[error("Platform error: {0}")]
    Platform(String),

    /// Generic error.
    #[error("Keychain error: {0}")]
    Other(String),
}

impl From<keyring::Error> for KeychainError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => KeychainError::NotFound {
                service: String::new(),
                account: String::new(),
            },
            keyring::Error::Ambiguous(_) => {
                KeychainError::Other("Ambiguous credential entry".to_string())
            }
            keyring::Error::PlatformFailure(e) => KeychainError::Platform(e.to_string()),
            keyring::Error::NoStorageAccess(_) => KeychainError::AccessDenied,
            _ => KeychainError::Other(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_passthrough() {
        let err: FetchError = ApiError::new(401, "Unauthorized").into();
        assert!(err.is_unauthorized());
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[test]
    fn test_transport_errors() {
        assert!(FetchError::Timeout.is_transport());
        assert!(FetchError::Network("refused".into()).is_transport());
        assert!(FetchError::Network("refused".into()).api_error().is_none());
    }

    #[test]
    fn test_user_message() {
        assert_eq!(FetchError::Timeout.user_message(), NETWORK_MESSAGE);
        let err: FetchError = ApiError::new(400, "CSV inválido").into();
        assert_eq!(err.user_message(), "CSV inválido");
    }
}
