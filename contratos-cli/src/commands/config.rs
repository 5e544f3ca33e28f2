//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use contratos_fetch::{API_URL_ENV, DEFAULT_API_URL, resolve_base_url, resolve_base_url_with};
use contratos_store::{
    LogLevel, SettingsStore, default_config_dir, default_settings_path, default_view_path,
};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set the API base URL. An empty value restores the default.
    SetUrl {
        /// Base URL, e.g. http://localhost:3000.
        url: String,
    },

    /// Set the default page size.
    PageSize {
        /// Items per page.
        size: u32,
    },

    /// Set the log level used without --verbose.
    LogLevel {
        /// One of: error, warn, info, debug, trace.
        level: LogLevel,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::SetUrl { url } => set_url(url).await,
        ConfigAction::PageSize { size } => set_page_size(*size).await,
        ConfigAction::LogLevel { level } => set_log_level(*level).await,
        ConfigAction::Reset => reset_config().await,
    }
}

/// Where the effective API URL came from.
fn url_source(cli: &Cli, configured: Option<&str>) -> &'static str {
    let set = |v: Option<&str>| v.is_some_and(|v| !v.trim().is_empty());
    let env = std::env::var(API_URL_ENV).ok();
    if set(cli.api_url.as_deref()) {
        "--api-url"
    } else if set(env.as_deref()) {
        API_URL_ENV
    } else if set(configured) {
        "settings"
    } else {
        "default"
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let settings = store.get().await;
    let url = resolve_base_url(cli.api_url.as_deref(), settings.api_url.as_deref())?;
    let source = url_source(cli, settings.api_url.as_deref());

    match cli.format {
        OutputFormat::Text => {
            println!("Contratos Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("API URL:   {url} ({source})");
            println!("Timeout:   {}s", settings.timeout().as_secs());
            println!("Page size: {}", settings.page_size());
            println!("Log level: {}", settings.log_level);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "apiUrl": url.as_str(),
                "apiUrlSource": source,
                "settings": settings,
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = default_settings_path();
    let view_path = default_view_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
            println!("View file:     {}", view_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
                "view_file": view_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_url(url: &str) -> Result<()> {
    let url = url.trim();
    if !url.is_empty() {
        resolve_base_url_with(Some(url), None, None)?;
    }

    let store = SettingsStore::load_default().await?;
    store.set_api_url(Some(url.to_string())).await;
    store.save().await?;

    if url.is_empty() {
        info!("API URL cleared");
        println!("API URL restored to default: {DEFAULT_API_URL}");
    } else {
        info!(url = %url, "API URL updated");
        println!("API URL set to: {url}");
    }

    Ok(())
}

async fn set_page_size(size: u32) -> Result<()> {
    if size == 0 {
        anyhow::bail!("Page size must be at least 1");
    }

    let store = SettingsStore::load_default().await?;
    store.update(|s| s.page_size = size).await;
    store.save().await?;

    info!(size, "Page size updated");
    println!("Page size set to: {size}");

    Ok(())
}

async fn set_log_level(level: LogLevel) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    store.update(|s| s.log_level = level).await;
    store.save().await?;

    info!(level = %level, "Log level updated");
    println!("Log level set to: {level}");

    Ok(())
}

async fn reset_config() -> Result<()> {
    let path = default_settings_path();

    if path.exists() {
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Settings reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
