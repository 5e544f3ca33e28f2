//! Store error types.

use thiserror::Error;

/// Errors reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the upload flow before or instead of a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// No file was offered.
    #[error("Nenhum arquivo selecionado")]
    NoFile,

    /// More than one file was offered.
    #[error("Selecione apenas um arquivo ({0} recebidos)")]
    TooManyFiles(usize),

    /// The file is not a CSV.
    #[error("Arquivo inválido: {0}. Envie um arquivo .csv")]
    NotCsv(String),

    /// An upload is already being submitted.
    #[error("Upload em andamento")]
    InProgress,
}
