//! HTTP transport.
//!
//! The [`Transport`] trait is the seam between request construction and the
//! network: [`crate::client::ApiClient`] builds a complete `reqwest::Request`
//! and hands it to a transport, which returns the status and raw body.
//! [`ReqwestTransport`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode};
use tracing::{debug, instrument};

use crate::error::FetchError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string.
pub const USER_AGENT: &str = concat!("contratos/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Transport
// ============================================================================

/// Status and body of a received response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Executes built requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request once and reads the full body.
    ///
    /// Returns `Err` only when no response was received; non-success statuses
    /// are returned as `Ok` for the caller to interpret.
    async fn execute(&self, request: Request) -> Result<TransportResponse, FetchError>;
}

// ============================================================================
// Reqwest Transport
// ============================================================================

/// Transport backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a transport with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { inner: client })
    }

    /// Returns the inner reqwest client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    async fn execute(&self, request: Request) -> Result<TransportResponse, FetchError> {
        debug!("Sending request");

        let response = self.inner.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(status = %status, bytes = body.len(), "Response received");
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}
