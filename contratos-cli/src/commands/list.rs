//! List command: shows one page of contracts.
//!
//! The last view is saved to `view.json`, so `contratos list --next` keeps
//! the filters of the previous call and moves one page forward.

use anyhow::{Result, bail};
use chrono::Utc;
use clap::Args;
use contratos_core::{FilterField, FilterOption, STATUS_OPTIONS, TIPO_PLANO_OPTIONS};
use contratos_fetch::FetchError;
use contratos_store::{ContratosQuery, QueryBinding, ViewState, default_view_path};
use tracing::{debug, warn};

use crate::commands::AppContext;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, CliError, ExitCode, OutputFormat};

/// Arguments for the list command.
#[derive(Args, Default)]
pub struct ListArgs {
    /// Contract identifier.
    #[arg(long)]
    pub id: Option<String>,

    /// Client name (substring).
    #[arg(long)]
    pub nome: Option<String>,

    /// Client email (substring).
    #[arg(long)]
    pub email: Option<String>,

    /// Plan type: Basico, Pro or Enterprise. Empty clears the filter.
    #[arg(long)]
    pub plano: Option<String>,

    /// Status: Ativo or Inativo. Empty clears the filter.
    #[arg(long)]
    pub status: Option<String>,

    /// Monthly value, sent as-is.
    #[arg(long)]
    pub valor: Option<String>,

    /// Start date, sent as-is.
    #[arg(long)]
    pub data_inicio: Option<String>,

    /// Page number.
    #[arg(long)]
    pub page: Option<u32>,

    /// Page size.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Start from this query string instead of the saved view.
    #[arg(long)]
    pub query: Option<String>,

    /// Clear all filters before applying the others.
    #[arg(long)]
    pub clear: bool,

    /// Go to the next page of the saved view.
    #[arg(long, conflicts_with_all = ["prev", "page"])]
    pub next: bool,

    /// Go to the previous page of the saved view.
    #[arg(long, conflicts_with = "page")]
    pub prev: bool,

    /// Do not save the view.
    #[arg(long)]
    pub no_save: bool,
}

/// Runs the list command.
pub async fn run(args: &ListArgs, cli: &Cli) -> Result<()> {
    let ctx = AppContext::connect(cli).await?;
    let view_path = default_view_path();

    let view = match &args.query {
        Some(query) => ViewState {
            query: query.trim_start_matches('?').to_string(),
            ..ViewState::default()
        },
        None => ViewState::load(&view_path).await,
    };
    let mut binding = view.binding().with_default_limit(ctx.settings.page_size());
    apply_args(&mut binding, args, view.total_pages)?;
    debug!(query = %binding.query_string(), "Resolved view");

    ctx.require_auth().await?;

    let color = !cli.no_color;
    let text = TextFormatter::new(color);
    if cli.format == OutputFormat::Text && !cli.quiet {
        eprintln!("{}", text.format_loading());
    }

    let query = ContratosQuery::new(ctx.client.clone());
    let snapshot = query.fetch_page(&binding.filters()).await;

    let page = match (snapshot.data, snapshot.error) {
        (_, Some(error)) => return report_error(&error, cli),
        (Some(page), None) => page,
        (None, None) => bail!("Nenhuma resposta do servidor"),
    };

    if !args.no_save {
        if let Err(e) = ViewState::capture(&binding, Some(page.total_pages))
            .save(&view_path)
            .await
        {
            warn!(error = %e, "Failed to save view");
        }
    }

    match cli.format {
        OutputFormat::Text => {
            println!("{}", text.format_page(&page));
            if !cli.quiet {
                println!();
                println!("{}", text.format_query(&binding.query_string()));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let fetched_at = snapshot.updated_at.or_else(|| Some(Utc::now()));
            println!(
                "{}",
                formatter.format_page(&page, &binding.query_string(), fetched_at)?
            );
        }
    }

    Ok(())
}

/// Applies command-line flags to the binding.
///
/// `--clear` runs first, then the filters, then the page movement. Every
/// filter change sends the view back to page 1.
pub fn apply_args(
    binding: &mut QueryBinding,
    args: &ListArgs,
    total_pages: Option<u32>,
) -> Result<()> {
    if args.clear {
        binding.clear_filters();
    }

    let text_filters = [
        (FilterField::IdContrato, &args.id),
        (FilterField::NomeCliente, &args.nome),
        (FilterField::EmailCliente, &args.email),
        (FilterField::ValorMensal, &args.valor),
        (FilterField::DataInicio, &args.data_inicio),
    ];
    for (field, value) in text_filters {
        if let Some(value) = value {
            binding.set(field, value.trim())?;
        }
    }

    if let Some(plano) = &args.plano {
        binding.set(FilterField::TipoPlano, option_value(TIPO_PLANO_OPTIONS, plano, "plano")?)?;
    }
    if let Some(status) = &args.status {
        binding.set(FilterField::Status, option_value(STATUS_OPTIONS, status, "status")?)?;
    }
    if let Some(limit) = args.limit {
        binding.set(FilterField::Limit, limit.to_string())?;
    }

    if let Some(page) = args.page {
        binding.set(FilterField::Page, page.max(1).to_string())?;
    } else if args.next {
        // Without a known total, allow one step forward.
        let total = total_pages.unwrap_or(binding.page() + 1);
        if !binding.next_page(total) {
            debug!(page = binding.page(), total, "Already on the last page");
        }
    } else if args.prev && !binding.previous_page() {
        debug!("Already on the first page");
    }

    Ok(())
}

/// Maps user input to the option value. Empty input clears the filter.
fn option_value(options: &'static [FilterOption], input: &str, name: &str) -> Result<String> {
    if input.trim().is_empty() {
        return Ok(String::new());
    }
    match FilterOption::find(options, input) {
        Some(option) => Ok(option.value.to_string()),
        None => {
            let valid: Vec<&str> = options.iter().map(|o| o.value).collect();
            bail!("Valor inválido para {name}: {input} (use {})", valid.join(", "))
        }
    }
}

fn report_error(error: &FetchError, cli: &Cli) -> Result<()> {
    let code = if error.is_unauthorized() {
        ExitCode::NotAuthenticated
    } else {
        ExitCode::ApiError
    };
    match cli.format {
        OutputFormat::Text => {
            eprintln!("{}", TextFormatter::new(!cli.no_color).format_list_error(&error.user_message()));
        }
        OutputFormat::Json => {
            let status = error.api_error().map(|e| e.status_code);
            println!(
                "{}",
                JsonFormatter::new(cli.pretty).format_error(&error.user_message(), status)?
            );
        }
    }
    Err(CliError::Reported(code).into())
}
