//! CSV upload flow.
//!
//! ```text
//! Idle --select--> Selected --submit--> Submitting --ok--> Idle
//!                     ^                      |
//!                     +--------error---------+
//! ```
//!
//! Selection is validated locally and never touches the network. A
//! successful upload publishes [`Collection::Contratos`] invalidation to
//! every registered [`Invalidate`] listener.

use std::path::Path;
use std::sync::Arc;

use contratos_core::format::format_size_kb;
use contratos_fetch::{ContratosApi, FetchError, UploadFile};
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::UploadError;
use crate::query_cache::{Collection, Invalidate};

/// Field errors listed before the overflow line.
pub const MAX_LISTED_ERRORS: usize = 5;

/// Accepted MIME type.
pub const CSV_MIME: &str = "text/csv";

const NO_FILE_MESSAGE: &str = "Selecione um arquivo CSV";
const FALLBACK_MESSAGE: &str = "Erro ao fazer upload";

// ============================================================================
// Notifications
// ============================================================================

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The upload succeeded.
    Success,
    /// The upload failed or could not start.
    Error,
}

/// User-facing outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity.
    pub kind: NotificationKind,
    /// Main message.
    pub title: String,
    /// Listed field errors, at most [`MAX_LISTED_ERRORS`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    /// `"... e mais N erros"` when errors were left out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow: Option<String>,
}

impl Notification {
    /// Success notification.
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            details: Vec::new(),
            overflow: None,
        }
    }

    /// Error notification.
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            details: Vec::new(),
            overflow: None,
        }
    }

    /// Notification for an uploaded file.
    pub fn uploaded(inserted: u64) -> Self {
        Self::success(format!("Upload realizado! {inserted} contratos inseridos."))
    }

    /// Notification for a failed upload.
    pub fn failed(error: &FetchError) -> Self {
        let title = match error {
            FetchError::Api(e) if !e.message.trim().is_empty() => e.message.clone(),
            FetchError::Api(_) => FALLBACK_MESSAGE.to_string(),
            e if e.is_transport() => e.user_message(),
            _ => FALLBACK_MESSAGE.to_string(),
        };
        let errors = error.api_error().map(|e| e.field_errors()).unwrap_or_default();
        Self::error(title).with_field_errors(errors)
    }

    /// Lists the first [`MAX_LISTED_ERRORS`] errors and summarizes the rest.
    #[must_use]
    pub fn with_field_errors(mut self, errors: &[String]) -> Self {
        self.details = errors.iter().take(MAX_LISTED_ERRORS).cloned().collect();
        let remaining = errors.len().saturating_sub(MAX_LISTED_ERRORS);
        self.overflow = (remaining > 0).then(|| format!("... e mais {remaining} erros"));
        self
    }

    /// Returns true for a success notification.
    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }
}

// ============================================================================
// State
// ============================================================================

/// Upload state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    /// Nothing selected.
    Idle,
    /// A file is ready to submit.
    Selected(UploadFile),
    /// The file is being sent.
    Submitting(UploadFile),
}

impl UploadState {
    /// The selected or submitting file.
    pub fn file(&self) -> Option<&UploadFile> {
        match self {
            Self::Idle => None,
            Self::Selected(f) | Self::Submitting(f) => Some(f),
        }
    }
}

/// Name and display size of the selected file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub bytes: u64,
    /// Size in KB with two decimals.
    pub size: String,
}

impl From<&UploadFile> for SelectedFile {
    fn from(file: &UploadFile) -> Self {
        Self {
            name: file.file_name.clone(),
            bytes: file.size(),
            size: format_size_kb(file.size()),
        }
    }
}

/// Returns true if the file looks like a CSV.
///
/// The extension must be `.csv` (any case). A declared MIME type, when
/// present, must be `text/csv`.
pub fn is_csv(file: &UploadFile) -> bool {
    let ext_ok = Path::new(&file.file_name)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let mime_ok = file.mime.as_deref().is_none_or(|m| {
        m.split(';')
            .next()
            .is_some_and(|base| base.trim().eq_ignore_ascii_case(CSV_MIME))
    });
    ext_ok && mime_ok
}

// ============================================================================
// Upload Flow
// ============================================================================

/// Drives selection and submission of a contracts CSV.
pub struct UploadFlow {
    state: Mutex<UploadState>,
    api: Arc<dyn ContratosApi>,
    listeners: Vec<Arc<dyn Invalidate>>,
}

impl UploadFlow {
    /// Creates an idle flow.
    pub fn new(api: Arc<dyn ContratosApi>) -> Self {
        Self {
            state: Mutex::new(UploadState::Idle),
            api,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener invalidated after each successful upload.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn Invalidate>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Current state.
    pub async fn state(&self) -> UploadState {
        self.state.lock().await.clone()
    }

    /// Summary of the selected file, if any.
    pub async fn selected(&self) -> Option<SelectedFile> {
        self.state.lock().await.file().map(SelectedFile::from)
    }

    /// Selects the file to upload.
    ///
    /// # Errors
    ///
    /// - [`UploadError::NoFile`] / [`UploadError::TooManyFiles`] unless exactly one file is given
    /// - [`UploadError::NotCsv`] for a non-CSV file
    /// - [`UploadError::InProgress`] while submitting
    ///
    /// The state is unchanged on error.
    pub async fn select(&self, files: Vec<UploadFile>) -> Result<SelectedFile, UploadError> {
        let mut state = self.state.lock().await;
        if matches!(*state, UploadState::Submitting(_)) {
            return Err(UploadError::InProgress);
        }

        let mut files = files.into_iter();
        let file = match (files.next(), files.len()) {
            (None, _) => return Err(UploadError::NoFile),
            (Some(file), 0) => file,
            (Some(_), rest) => return Err(UploadError::TooManyFiles(rest + 1)),
        };
        if !is_csv(&file) {
            debug!(file = %file.file_name, mime = ?file.mime, "Rejected non-CSV file");
            return Err(UploadError::NotCsv(file.file_name));
        }

        let selected = SelectedFile::from(&file);
        debug!(file = %selected.name, bytes = selected.bytes, "File selected");
        *state = UploadState::Selected(file);
        Ok(selected)
    }

    /// Drops the selection.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InProgress`] while submitting.
    pub async fn clear(&self) -> Result<(), UploadError> {
        let mut state = self.state.lock().await;
        if matches!(*state, UploadState::Submitting(_)) {
            return Err(UploadError::InProgress);
        }
        *state = UploadState::Idle;
        Ok(())
    }

    /// Submits the selected file.
    ///
    /// Without a selection no request is made and a notification asking for
    /// a file is returned. On success the selection is cleared and listeners
    /// are invalidated; on failure the file stays selected.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InProgress`] if a submission is already running.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<Notification, UploadError> {
        let file = {
            let mut state = self.state.lock().await;
            match &*state {
                UploadState::Idle => return Ok(Notification::error(NO_FILE_MESSAGE)),
                UploadState::Submitting(_) => return Err(UploadError::InProgress),
                UploadState::Selected(file) => {
                    let file = file.clone();
                    *state = UploadState::Submitting(file.clone());
                    file
                }
            }
        };

        let result = self.api.upload_contratos(&file).await;

        let notification = match result {
            Ok(response) => {
                *self.state.lock().await = UploadState::Idle;
                info!(file = %file.file_name, inserted = response.inserted, "Upload finished");
                join_all(
                    self.listeners
                        .iter()
                        .map(|l| l.invalidate(Collection::Contratos)),
                )
                .await;
                Notification::uploaded(response.inserted)
            }
            Err(e) => {
                *self.state.lock().await = UploadState::Selected(file);
                warn!(error = %e, "Upload failed");
                Notification::failed(&e)
            }
        };
        Ok(notification)
    }
}
