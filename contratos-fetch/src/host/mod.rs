//! Host APIs for the contracts client.
//!
//! - [`keychain`] - Secure credential storage (system keychain)
//! - [`http`] - HTTP transport seam and the `reqwest` implementation

pub mod http;
pub mod keychain;

// Re-export key types
pub use http::{ReqwestTransport, Transport, TransportResponse};
pub use keychain::{KeychainApi, SystemKeychain};
