//! Endpoint payloads and the structured API error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Login
// ============================================================================

/// Body of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// User name.
    pub usuario: String,
    /// Password.
    pub senha: String,
}

impl LoginRequest {
    /// Creates a login request.
    pub fn new(usuario: impl Into<String>, senha: impl Into<String>) -> Self {
        Self {
            usuario: usuario.into(),
            senha: senha.into(),
        }
    }
}

/// Response of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
}

// ============================================================================
// Upload
// ============================================================================

/// Response of `POST /contratos/upload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Number of rows inserted.
    pub inserted: u64,
}

// ============================================================================
// API Error
// ============================================================================

/// Structured error for a non-success response.
///
/// Either parsed from the response body or, when the body is not a JSON
/// object, synthesized from the status code and reason phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status code.
    pub status_code: u16,
    /// Human-readable message.
    pub message: String,
    /// Field- or row-level error messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Error body as the server may send it. The framework reports validation
/// failures with `message` as a list.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawApiError {
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    message: Option<RawMessage>,
    #[serde(default)]
    errors: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMessage {
    One(String),
    Many(Vec<String>),
}

impl ApiError {
    /// Creates an error with a message and no field errors.
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            errors: None,
        }
    }

    /// Attaches field-level errors.
    #[must_use]
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Builds the error for a non-success response.
    ///
    /// `status_text` is the reason phrase used when the body does not carry
    /// a usable error object.
    pub fn from_response(status_code: u16, status_text: &str, body: &[u8]) -> Self {
        let synthesized = || Self::new(status_code, status_text);

        let Ok(raw) = serde_json::from_slice::<RawApiError>(body) else {
            return synthesized();
        };

        let message = match raw.message {
            Some(RawMessage::One(m)) => m,
            Some(RawMessage::Many(list)) => list.join("; "),
            None => status_text.to_string(),
        };

        Self {
            status_code: raw.status_code.unwrap_or(status_code),
            message,
            errors: raw.errors,
        }
    }

    /// Returns the field-level errors (empty if none).
    pub fn field_errors(&self) -> &[String] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Returns true for a 401 response (missing or expired token).
    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401
    }
}
