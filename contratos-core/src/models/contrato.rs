//! Contract records.
//!
//! This module contains the record type returned by the listing endpoint:
//! - [`Contrato`] - A single contract
//! - [`TipoPlano`] - Subscription plan
//! - [`StatusContrato`] - Contract status
//! - [`FilterOption`] - Values offered by the plan and status filters

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Contract
// ============================================================================

/// A contract record as returned by `GET /contratos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contrato {
    /// Contract identifier.
    pub id_contrato: String,
    /// Client name.
    pub nome_cliente: String,
    /// Client email.
    pub email_cliente: String,
    /// Subscription plan.
    pub tipo_plano: TipoPlano,
    /// Monthly value as a decimal string (e.g. `"199.90"`).
    pub valor_mensal: String,
    /// Contract status.
    pub status: StatusContrato,
    /// Start date (ISO-8601).
    pub data_inicio: String,
    /// Creation timestamp (ISO-8601).
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp (ISO-8601).
    #[serde(default)]
    pub updated_at: String,
}

impl Contrato {
    /// Returns true if the contract is active.
    pub fn is_active(&self) -> bool {
        self.status == StatusContrato::Ativo
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Subscription plan of a contract.
///
/// Values the client does not know are kept verbatim in [`TipoPlano::Other`]
/// so a single unexpected row does not fail the whole page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TipoPlano {
    /// Basic plan.
    Basico,
    /// Professional plan.
    Pro,
    /// Enterprise plan.
    Enterprise,
    /// Any other value sent by the server.
    Other(String),
}

impl TipoPlano {
    /// Returns the wire representation (`BASICO`, `PRO`, `ENTERPRISE`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basico => "BASICO",
            Self::Pro => "PRO",
            Self::Enterprise => "ENTERPRISE",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for TipoPlano {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "BASICO" => Self::Basico,
            "PRO" => Self::Pro,
            "ENTERPRISE" => Self::Enterprise,
            _ => Self::Other(value),
        }
    }
}

impl From<TipoPlano> for String {
    fn from(value: TipoPlano) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TipoPlano {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Status
// ============================================================================

/// Status of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusContrato {
    /// Active contract.
    Ativo,
    /// Inactive contract.
    Inativo,
    /// Any other value sent by the server.
    Other(String),
}

impl StatusContrato {
    /// Returns the wire representation (`ATIVO`, `INATIVO`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ativo => "ATIVO",
            Self::Inativo => "INATIVO",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for StatusContrato {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "ATIVO" => Self::Ativo,
            "INATIVO" => Self::Inativo,
            _ => Self::Other(value),
        }
    }
}

impl From<StatusContrato> for String {
    fn from(value: StatusContrato) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for StatusContrato {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Filter Options
// ============================================================================

/// A selectable value of an enumerated filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOption {
    /// Value sent to the server.
    pub value: &'static str,
    /// Human-readable label.
    pub label: &'static str,
}

impl FilterOption {
    /// Finds the option matching `input` by value or label, ignoring case.
    pub fn find(options: &'static [FilterOption], input: &str) -> Option<&'static FilterOption> {
        let input = input.trim();
        options
            .iter()
            .find(|o| o.value.eq_ignore_ascii_case(input) || o.label.eq_ignore_ascii_case(input))
    }
}

/// Options offered by the plan filter.
pub const TIPO_PLANO_OPTIONS: &[FilterOption] = &[
    FilterOption { value: "Basico", label: "Básico" },
    FilterOption { value: "Pro", label: "Pro" },
    FilterOption { value: "Enterprise", label: "Enterprise" },
];

/// Options offered by the status filter.
pub const STATUS_OPTIONS: &[FilterOption] = &[
    FilterOption { value: "Ativo", label: "Ativo" },
    FilterOption { value: "Inativo", label: "Inativo" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_parsing_is_case_insensitive() {
        assert_eq!(TipoPlano::from("basico".to_string()), TipoPlano::Basico);
        assert_eq!(TipoPlano::from("PRO".to_string()), TipoPlano::Pro);
        assert_eq!(
            TipoPlano::from("Gold".to_string()),
            TipoPlano::Other("Gold".to_string())
        );
    }

    #[test]
    fn test_filter_option_lookup() {
        let opt = FilterOption::find(TIPO_PLANO_OPTIONS, "básico").unwrap();
        assert_eq!(opt.value, "Basico");

        let opt = FilterOption::find(STATUS_OPTIONS, "INATIVO").unwrap();
        assert_eq!(opt.value, "Inativo");

        assert!(FilterOption::find(STATUS_OPTIONS, "pendente").is_none());
    }
}
