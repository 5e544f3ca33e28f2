// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Contratos CLI - browse and import customer contracts from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Sign in
//! contratos login --usuario admin
//!
//! # First page of active contracts
//! contratos list --status Ativo
//!
//! # Next page of the same view
//! contratos list --next
//!
//! # Open a shared view
//! contratos list --query "tipo_plano=Pro&page=2"
//!
//! # Import a CSV
//! contratos upload contratos.csv
//!
//! # JSON output
//! contratos list --format json --pretty
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use contratos_fetch::FetchError;
use contratos_store::{LogLevel, SettingsStore};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{auth, config, list, upload};

// ============================================================================
// CLI Definition
// ============================================================================

/// Contratos CLI - customer contract management.
#[derive(Parser)]
#[command(name = "contratos")]
#[command(about = "Customer contract management CLI")]
#[command(long_about = r#"
Lists, filters and imports customer contracts through the contracts API.

The last list view is saved, so --next and --prev continue from it.

Examples:
  contratos login --usuario admin      # Sign in
  contratos list --status Ativo        # Filter by status
  contratos list --next                # Next page
  contratos list --clear               # Drop all filters
  contratos upload contratos.csv       # Import a CSV
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'list' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// API base URL. Overrides CONTRATOS_API_URL and the settings file.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Access token for this invocation only.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the access token.
    Login(auth::LoginArgs),

    /// Remove the stored access token.
    Logout,

    /// Show whether a token is stored.
    #[command(visible_alias = "status")]
    Whoami,

    /// List contracts (default if no command specified).
    #[command(visible_alias = "ls")]
    List(list::ListArgs),

    /// Upload a contracts CSV.
    #[command(visible_alias = "up")]
    Upload(upload::UploadArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No token, or the server rejected it.
    NotAuthenticated = 2,
    /// The server reported an error.
    ApiError = 3,
}

/// Errors with a dedicated exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// No token is stored.
    #[error("Não autenticado. Execute `contratos login`.")]
    NotAuthenticated,

    /// Already shown to the user; exit with the given code.
    #[error("exit code {0:?}")]
    Reported(ExitCode),
}

/// Maps an error to its exit code.
fn exit_code(error: &anyhow::Error) -> ExitCode {
    if let Some(e) = error.downcast_ref::<CliError>() {
        return match e {
            CliError::NotAuthenticated => ExitCode::NotAuthenticated,
            CliError::Reported(code) => *code,
        };
    }
    match error.downcast_ref::<FetchError>() {
        Some(e) if e.is_unauthorized() => ExitCode::NotAuthenticated,
        Some(FetchError::Api(_)) => ExitCode::ApiError,
        _ => ExitCode::Error,
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("contratos=debug,info")
    } else {
        EnvFilter::new(format!("contratos={level}"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Log level from the settings file, or the default.
async fn configured_log_level() -> LogLevel {
    match SettingsStore::load_default().await {
        Ok(store) => store.get().await.log_level,
        Err(_) => LogLevel::default(),
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, configured_log_level().await);

    let result = match &cli.command {
        Some(Commands::Login(args)) => auth::login(args, &cli).await,
        Some(Commands::Logout) => auth::logout(&cli).await,
        Some(Commands::Whoami) => auth::whoami(&cli).await,
        Some(Commands::List(args)) => list::run(args, &cli).await,
        Some(Commands::Upload(args)) => upload::run(args, &cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => list::run(&list::ListArgs::default(), &cli).await,
    };

    if let Err(e) = result {
        let code = exit_code(&e);
        let reported = matches!(e.downcast_ref::<CliError>(), Some(CliError::Reported(_)));
        if !cli.quiet && !reported {
            match cli.format {
                OutputFormat::Text => {
                    let formatter = output::TextFormatter::new(!cli.no_color);
                    eprintln!("{}", formatter.format_error(&user_message(&e)));
                }
                OutputFormat::Json => {
                    let status = e
                        .downcast_ref::<FetchError>()
                        .and_then(FetchError::api_error)
                        .map(|api| api.status_code);
                    let formatter = output::JsonFormatter::new(cli.pretty);
                    println!("{}", formatter.format_error(&user_message(&e), status)?);
                }
            }
        }
        std::process::exit(code as i32);
    }

    Ok(())
}

/// Message shown for an error: the server's message for API errors.
fn user_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<FetchError>() {
        Some(e) => e.user_message(),
        None => format!("{error:#}"),
    }
}
