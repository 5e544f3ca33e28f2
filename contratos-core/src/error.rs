//! Core error types for `contratos`.

use thiserror::Error;

/// Core error type for model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown filter key.
    #[error("Unknown filter field: {0}")]
    UnknownField(String),

    /// A numeric field received a value it cannot hold.
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Query key of the field.
        field: &'static str,
        /// Rejected input.
        value: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
