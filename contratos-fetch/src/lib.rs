// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Contratos Fetch
//!
//! HTTP access to the contracts backend.
//!
//! ## Host APIs
//!
//! The [`host`] module wraps system interactions:
//!
//! - [`host::keychain`] - Secure credential storage (system keychain)
//! - [`host::http`] - The [`Transport`] seam and its `reqwest` implementation
//!
//! ## Client
//!
//! - [`ApiClient`] - Builds requests, attaches the bearer token, normalizes errors
//! - [`ContratosApi`] - Login, list and upload operations
//! - [`TokenStore`] - Where the access token lives between calls
//!
//! ## Example
//!
//! ```ignore
//! use contratos_fetch::{ApiClient, ContratosApi, KeychainTokenStore};
//!
//! let client = ApiClient::builder()
//!     .tokens(Arc::new(KeychainTokenStore::new()))
//!     .build()?;
//!
//! let page = client.list_contratos(&FilterSet::with_defaults()).await?;
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod host;
pub mod token;

// Re-export main types
pub use api::{ContratosApi, endpoints};
pub use client::{
    API_URL_ENV, ApiClient, ApiClientBuilder, ApiRequest, DEFAULT_API_URL, QueryParams,
    RequestBody, UploadFile, decode_response, resolve_base_url, resolve_base_url_with,
};
pub use error::{FetchError, KeychainError, NETWORK_MESSAGE};
pub use host::{KeychainApi, ReqwestTransport, SystemKeychain, Transport, TransportResponse};
pub use token::{EnvTokenStore, KeychainTokenStore, MemoryTokenStore, TOKEN_ENV, TokenStore};
