// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Contratos Store
//!
//! Client-side state for the contracts dashboard.
//!
//! This crate provides:
//!
//! - **QueryBinding**: List filters bound to a shareable query string
//! - **ContratosQuery**: Cached, deduplicated page fetches
//! - **UploadFlow**: CSV selection and submission with cache invalidation
//! - **SettingsStore**: User preferences with persistence
//! - **Persistence**: Settings and list-view files
//!
//! ## Usage
//!
//! ```ignore
//! use contratos_store::{ContratosQuery, QueryBinding, UploadFlow};
//!
//! let query = Arc::new(ContratosQuery::new(api.clone()));
//! let uploads = UploadFlow::new(api).with_listener(query.clone());
//!
//! let mut binding = QueryBinding::from_query("status=ATIVO");
//! binding.set(FilterField::NomeCliente, "Ana")?;
//! let page = query.fetch_page(&binding.filters()).await;
//! ```

pub mod contratos;
pub mod error;
pub mod persistence;
pub mod query_cache;
pub mod query_state;
pub mod settings_store;
pub mod upload;

pub use contratos::{ContratosQuery, ContratosSnapshot};
pub use error::{StoreError, UploadError};
pub use persistence::{default_config_dir, default_settings_path, default_view_path};
pub use query_cache::{
    Begin, Collection, FetchTicket, Invalidate, MAX_ENTRIES, QueryCache, QueryKey, QuerySnapshot,
};
pub use query_state::{QueryBinding, ViewState};
pub use settings_store::{LogLevel, Settings, SettingsStore};
pub use upload::{Notification, NotificationKind, SelectedFile, UploadFlow, UploadState, is_csv};

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod upload_tests;
