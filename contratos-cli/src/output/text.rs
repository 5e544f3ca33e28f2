//! Text output formatting with tables and colors.

use contratos_core::format::{format_currency_brl, format_date_br};
use contratos_core::{
    Contrato, ContratosResponse, FilterOption, STATUS_OPTIONS, StatusContrato, TIPO_PLANO_OPTIONS,
};
use contratos_store::{Notification, NotificationKind, SelectedFile};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

const HEADERS: [&str; 6] = ["Cliente", "Email", "Plano", "Valor", "Status", "Início"];

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ========================================================================
    // Contract list
    // ========================================================================

    /// Formats a page of contracts: count header, table and page controls.
    pub fn format_page(&self, page: &ContratosResponse) -> String {
        let mut lines = vec![self.bold(&format!("{} contratos encontrados", page.total))];
        lines.push(String::new());

        if page.is_empty() {
            lines.push(self.dim("Nenhum contrato encontrado"));
        } else {
            lines.push(self.format_table(&page.items));
        }

        let pagination = page.pagination();
        if pagination.is_multi_page() {
            lines.push(String::new());
            lines.push(self.format_pagination(pagination.page, pagination.total_pages));
        }

        lines.join("\n")
    }

    /// Formats the contract table.
    pub fn format_table(&self, items: &[Contrato]) -> String {
        let rows: Vec<[String; 6]> = items.iter().map(row).collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut lines = Vec::with_capacity(rows.len() + 2);
        let header: Vec<String> = HEADERS
            .iter()
            .zip(widths)
            .map(|(h, w)| format!("{h:<w$}"))
            .collect();
        lines.push(self.bold(header.join("  ").trim_end()));
        lines.push(self.dim(&"─".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1))));

        for (item, cells) in items.iter().zip(&rows) {
            let padded: Vec<String> = cells
                .iter()
                .zip(widths)
                .enumerate()
                .map(|(i, (cell, w))| {
                    let text = format!("{cell:<w$}");
                    if i == 4 {
                        self.status_color(&item.status, &text)
                    } else {
                        text
                    }
                })
                .collect();
            lines.push(padded.join("  ").trim_end().to_string());
        }

        lines.join("\n")
    }

    /// Formats "Página X de Y" with previous/next availability.
    pub fn format_pagination(&self, page: u32, total_pages: u32) -> String {
        let previous = if page > 1 {
            self.cyan("‹ Anterior (--prev)")
        } else {
            self.dim("‹ Anterior")
        };
        let next = if page < total_pages {
            self.cyan("Próxima › (--next)")
        } else {
            self.dim("Próxima ›")
        };
        format!("{previous}   Página {page} de {total_pages}   {next}")
    }

    /// Formats the loading line.
    pub fn format_loading(&self) -> String {
        self.dim("Carregando contratos...")
    }

    /// Formats a list error shown in place of the table.
    pub fn format_list_error(&self, message: &str) -> String {
        self.red(&format!("Erro ao carregar contratos: {message}"))
    }

    /// Formats the shareable query string line.
    pub fn format_query(&self, query: &str) -> String {
        if query.is_empty() {
            self.dim("Consulta: (sem filtros)")
        } else {
            format!("Consulta: {}", self.cyan(&format!("?{query}")))
        }
    }

    // ========================================================================
    // Upload
    // ========================================================================

    /// Formats the selected file summary.
    pub fn format_selected(&self, file: &SelectedFile) -> String {
        format!("Arquivo: {} {}", self.bold(&file.name), self.dim(&format!("({})", file.size)))
    }

    /// Formats an upload notification.
    pub fn format_notification(&self, notification: &Notification) -> String {
        let title = match notification.kind {
            NotificationKind::Success => self.green(&format!("✓ {}", notification.title)),
            NotificationKind::Error => self.red(&format!("✗ {}", notification.title)),
        };

        let mut lines = vec![title];
        for detail in &notification.details {
            lines.push(format!("  • {detail}"));
        }
        if let Some(overflow) = &notification.overflow {
            lines.push(self.dim(&format!("  {overflow}")));
        }
        lines.join("\n")
    }

    /// Formats a generic error message.
    pub fn format_error(&self, error: &str) -> String {
        format!("{}: {}", self.red("Erro"), error)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn status_color(&self, status: &StatusContrato, text: &str) -> String {
        match status {
            StatusContrato::Ativo => self.green(text),
            StatusContrato::Inativo => self.red(text),
            StatusContrato::Other(_) => text.to_string(),
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Display label of an option value, or the value itself.
fn label(options: &'static [FilterOption], value: &str) -> String {
    FilterOption::find(options, value).map_or_else(|| value.to_string(), |o| o.label.to_string())
}

fn row(item: &Contrato) -> [String; 6] {
    [
        item.nome_cliente.clone(),
        item.email_cliente.clone(),
        label(TIPO_PLANO_OPTIONS, item.tipo_plano.as_str()),
        format_currency_brl(&item.valor_mensal),
        label(STATUS_OPTIONS, item.status.as_str()),
        format_date_br(&item.data_inicio),
    ]
}
