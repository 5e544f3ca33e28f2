//! Settings and list-view files.
//!
//! Both are small JSON documents. Writes go through a sibling temp file
//! that is restricted to the owner before it is renamed over the target.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

const APP_DIR: &str = "contratos";

/// Directory holding `settings.json`, under the platform config dir.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir().map_or_else(|| PathBuf::from("."), |dir| dir.join(APP_DIR))
}

/// Directory holding `view.json`, under the platform cache dir.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir().map_or_else(|| PathBuf::from("."), |dir| dir.join(APP_DIR))
}

/// Returns the default settings file path.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

/// Returns the default path of the persisted list view.
pub fn default_view_path() -> PathBuf {
    default_cache_dir().join("view.json")
}

#[cfg(unix)]
async fn restrict(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}

/// Writes `data` as pretty JSON, readable by the owner only.
///
/// A missing parent directory is created owner-only (0o700); an existing
/// one is left as it is.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] if `data` cannot be encoded and
/// [`StoreError::Io`] if a write fails.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(data)?;

    let missing_parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && !p.exists());
    if let Some(parent) = missing_parent {
        tokio::fs::create_dir_all(parent).await?;
        restrict(parent, 0o700).await?;
    }

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, json).await?;
    restrict(&temp_path, 0o600).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), "Saved");
    Ok(())
}

pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Reads `path`, or returns the default if it is missing or unreadable.
/// Corrupt files are logged and ignored.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_json(path).await {
        Ok(data) => data,
        Err(StoreError::Io(e)) => {
            debug!(path = %path.display(), error = %e, "Not loaded, using defaults");
            T::default()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse, using defaults");
            T::default()
        }
    }
}
