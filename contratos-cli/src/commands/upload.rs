//! Upload command - sends a contracts CSV.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use contratos_fetch::UploadFile;
use contratos_store::{Collection, Invalidate, UploadFlow, ViewState, default_view_path};
use tracing::{debug, warn};

use crate::commands::AppContext;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, CliError, ExitCode, OutputFormat};

/// Arguments for the upload command.
#[derive(Args)]
pub struct UploadArgs {
    /// CSV file to upload.
    pub file: PathBuf,
}

/// Forgets the saved page count once the contract list has changed.
pub struct SavedViewInvalidator {
    path: PathBuf,
}

impl SavedViewInvalidator {
    /// Creates an invalidator for the view file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Invalidate for SavedViewInvalidator {
    async fn invalidate(&self, collection: Collection) {
        if collection != Collection::Contratos || !self.path.exists() {
            return;
        }
        let mut view = ViewState::load(&self.path).await;
        view.total_pages = None;
        match view.save(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "Saved view invalidated"),
            Err(e) => warn!(error = %e, "Failed to invalidate saved view"),
        }
    }
}

/// Runs the upload command.
pub async fn run(args: &UploadArgs, cli: &Cli) -> Result<()> {
    let file = read_file(&args.file).await?;

    let ctx = AppContext::connect(cli).await?;
    ctx.require_auth().await?;

    let flow = UploadFlow::new(ctx.client.clone())
        .with_listener(Arc::new(SavedViewInvalidator::new(default_view_path())));
    let selected = flow.select(vec![file]).await?;

    let text = TextFormatter::new(!cli.no_color);
    if cli.format == OutputFormat::Text && !cli.quiet {
        println!("{}", text.format_selected(&selected));
    }

    let notification = flow.submit().await?;

    match cli.format {
        OutputFormat::Text => {
            if notification.is_success() {
                println!("{}", text.format_notification(&notification));
            } else {
                eprintln!("{}", text.format_notification(&notification));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_upload(&selected, &notification)?);
        }
    }

    if notification.is_success() {
        Ok(())
    } else {
        Err(CliError::Reported(ExitCode::ApiError).into())
    }
}

async fn read_file(path: &Path) -> Result<UploadFile> {
    UploadFile::from_path(path)
        .await
        .with_context(|| format!("Não foi possível ler {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contratos_store::QueryBinding;

    #[tokio::test]
    async fn test_invalidator_clears_total_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.json");
        let binding = QueryBinding::from_query("status=Ativo&page=2");
        ViewState::capture(&binding, Some(4)).save(&path).await.unwrap();

        SavedViewInvalidator::new(path.clone())
            .invalidate(Collection::Contratos)
            .await;

        let view = ViewState::load(&path).await;
        assert_eq!(view.total_pages, None);
        assert_eq!(view.binding(), binding);
    }

    #[tokio::test]
    async fn test_invalidator_skips_missing_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.json");

        SavedViewInvalidator::new(path.clone())
            .invalidate(Collection::Contratos)
            .await;

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(&dir.path().join("nope.csv")).await.unwrap_err();
        assert!(err.to_string().contains("nope.csv"));
    }
}
