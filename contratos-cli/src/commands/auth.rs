//! Session commands: login, logout, whoami.

use std::io::BufRead;

use anyhow::{Context, Result, bail};
use clap::Args;
use contratos_core::LoginRequest;
use tracing::info;

use crate::commands::AppContext;
use crate::output::JsonFormatter;
use crate::{Cli, CliError, OutputFormat};

/// Environment variable holding the password for non-interactive login.
pub const PASSWORD_ENV: &str = "CONTRATOS_SENHA";

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// User name.
    #[arg(long, short)]
    pub usuario: String,

    /// Password. Falls back to CONTRATOS_SENHA, then one line from stdin.
    #[arg(long, short)]
    pub senha: Option<String>,
}

/// Runs the login command.
pub async fn login(args: &LoginArgs, cli: &Cli) -> Result<()> {
    let senha = match &args.senha {
        Some(senha) => senha.clone(),
        None => match std::env::var(PASSWORD_ENV) {
            Ok(senha) if !senha.is_empty() => senha,
            _ => read_password_line()?,
        },
    };
    if senha.is_empty() {
        bail!("Informe a senha (--senha, {PASSWORD_ENV} ou stdin)");
    }

    let ctx = AppContext::connect(cli).await?;
    ctx.client
        .sign_in(&LoginRequest::new(args.usuario.clone(), senha))
        .await?;
    info!(usuario = %args.usuario, "Logged in");

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!("Login realizado como {}", args.usuario);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({ "authenticated": true, "usuario": args.usuario });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}

/// Runs the logout command.
pub async fn logout(cli: &Cli) -> Result<()> {
    let ctx = AppContext::connect(cli).await?;
    ctx.client.sign_out().await?;

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!("Sessão encerrada");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({ "authenticated": false });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}

/// Runs the whoami command. Exits with the not-authenticated code when no
/// token is stored.
pub async fn whoami(cli: &Cli) -> Result<()> {
    let ctx = AppContext::connect(cli).await?;
    let authenticated = ctx.client.tokens().is_authenticated().await;

    match cli.format {
        OutputFormat::Text => {
            let state = if authenticated {
                "Autenticado"
            } else {
                "Não autenticado"
            };
            println!("{state} em {}", ctx.client.base_url());
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "authenticated": authenticated,
                "apiUrl": ctx.client.base_url().as_str(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    if authenticated {
        Ok(())
    } else {
        Err(CliError::Reported(crate::ExitCode::NotAuthenticated).into())
    }
}

fn read_password_line() -> Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Falha ao ler a senha")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
