//! Filter set for the contract listing.
//!
//! A [`FilterSet`] is the typed form of the listing query. It maps in both
//! directions to a query string (see [`FilterSet::from_query`] and
//! [`FilterSet::to_query`]) and produces the ordered request parameters and
//! the canonical cache key used by the fetch layer.
//!
//! Empty values never leave this type: setting a field to `""` clears it,
//! and neither the request parameters nor the query string ever carry a
//! `key=` pair.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::CoreError;

/// Page shown when none is requested.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when none is requested.
pub const DEFAULT_LIMIT: u32 = 20;

// ============================================================================
// Filter Field
// ============================================================================

/// Recognized filter keys, in the order they are sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterField {
    /// Exact contract identifier.
    IdContrato,
    /// Client name substring.
    NomeCliente,
    /// Client email substring.
    EmailCliente,
    /// Plan type.
    TipoPlano,
    /// Contract status.
    Status,
    /// Monthly value (passthrough, no dedicated control).
    ValorMensal,
    /// Start date (passthrough, no dedicated control).
    DataInicio,
    /// Page number, 1-based.
    Page,
    /// Page size.
    Limit,
}

impl FilterField {
    /// All fields in request order.
    pub const ALL: [FilterField; 9] = [
        FilterField::IdContrato,
        FilterField::NomeCliente,
        FilterField::EmailCliente,
        FilterField::TipoPlano,
        FilterField::Status,
        FilterField::ValorMensal,
        FilterField::DataInicio,
        FilterField::Page,
        FilterField::Limit,
    ];

    /// Text and enum fields (everything except page and limit).
    pub const TEXT: [FilterField; 7] = [
        FilterField::IdContrato,
        FilterField::NomeCliente,
        FilterField::EmailCliente,
        FilterField::TipoPlano,
        FilterField::Status,
        FilterField::ValorMensal,
        FilterField::DataInicio,
    ];

    /// Returns the query-string key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::IdContrato => "id_contrato",
            Self::NomeCliente => "nome_cliente",
            Self::EmailCliente => "email_cliente",
            Self::TipoPlano => "tipo_plano",
            Self::Status => "status",
            Self::ValorMensal => "valor_mensal",
            Self::DataInicio => "data_inicio",
            Self::Page => "page",
            Self::Limit => "limit",
        }
    }

    /// Looks up a field by its query-string key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Returns true for the page number field.
    pub const fn is_page(self) -> bool {
        matches!(self, Self::Page)
    }

    /// Returns true for integer-valued fields.
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Page | Self::Limit)
    }
}

impl FromStr for FilterField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ============================================================================
// Filter Set
// ============================================================================

/// Named optional filters plus page number and page size.
///
/// `None` means "not filtered". Text fields never hold an empty string and
/// `page`/`limit` are never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSet {
    /// Exact contract identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_contrato: Option<String>,
    /// Client name substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome_cliente: Option<String>,
    /// Client email substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_cliente: Option<String>,
    /// Plan type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_plano: Option<String>,
    /// Contract status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Monthly value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor_mensal: Option<String>,
    /// Start date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_inicio: Option<String>,
    /// Page number, 1-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl FilterSet {
    /// Creates an empty filter set (no filters, no page, no limit).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter set with page and limit at their defaults.
    pub fn with_defaults() -> Self {
        Self {
            page: Some(DEFAULT_PAGE),
            limit: Some(DEFAULT_LIMIT),
            ..Self::default()
        }
    }

    /// Builds a filter set from `(key, value)` pairs.
    ///
    /// Empty values leave the field unset.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key or a non-numeric/zero page or limit.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (key, value) in pairs {
            let field = key.as_ref().parse::<FilterField>()?;
            set.set(field, value)?;
        }
        Ok(set)
    }

    /// Builder-style [`FilterSet::set`].
    ///
    /// # Errors
    ///
    /// See [`FilterSet::set`].
    pub fn with(mut self, field: FilterField, value: impl Into<String>) -> Result<Self, CoreError> {
        self.set(field, value)?;
        Ok(self)
    }

    /// Returns the value of a field, if set.
    pub fn get(&self, field: FilterField) -> Option<String> {
        match field {
            FilterField::Page => self.page.map(|p| p.to_string()),
            FilterField::Limit => self.limit.map(|l| l.to_string()),
            _ => self.text(field).map(str::to_string),
        }
    }

    /// Returns a text field's value, or `None` for unset and numeric fields.
    pub fn text(&self, field: FilterField) -> Option<&str> {
        let slot = match field {
            FilterField::IdContrato => &self.id_contrato,
            FilterField::NomeCliente => &self.nome_cliente,
            FilterField::EmailCliente => &self.email_cliente,
            FilterField::TipoPlano => &self.tipo_plano,
            FilterField::Status => &self.status,
            FilterField::ValorMensal => &self.valor_mensal,
            FilterField::DataInicio => &self.data_inicio,
            FilterField::Page | FilterField::Limit => return None,
        };
        slot.as_deref().filter(|v| !v.is_empty())
    }

    /// Sets a field. An empty value clears it.
    ///
    /// Setting a field does not touch the page; page reset on filter change
    /// is the query binding's policy.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidValue`] when `page` or `limit` is not a
    /// positive integer.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) -> Result<(), CoreError> {
        let value = value.into();
        match field {
            FilterField::Page => self.page = parse_positive(field, &value)?,
            FilterField::Limit => self.limit = parse_positive(field, &value)?,
            _ => {
                if let Some(slot) = self.text_slot(field) {
                    *slot = (!value.is_empty()).then_some(value);
                }
            }
        }
        Ok(())
    }

    /// Clears a field.
    pub fn unset(&mut self, field: FilterField) {
        match field {
            FilterField::Page => self.page = None,
            FilterField::Limit => self.limit = None,
            _ => {
                if let Some(slot) = self.text_slot(field) {
                    *slot = None;
                }
            }
        }
    }

    fn text_slot(&mut self, field: FilterField) -> Option<&mut Option<String>> {
        match field {
            FilterField::IdContrato => Some(&mut self.id_contrato),
            FilterField::NomeCliente => Some(&mut self.nome_cliente),
            FilterField::EmailCliente => Some(&mut self.email_cliente),
            FilterField::TipoPlano => Some(&mut self.tipo_plano),
            FilterField::Status => Some(&mut self.status),
            FilterField::ValorMensal => Some(&mut self.valor_mensal),
            FilterField::DataInicio => Some(&mut self.data_inicio),
            FilterField::Page | FilterField::Limit => None,
        }
    }

    /// Returns the page number, defaulting to 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    /// Sets the page number, clamped to at least 1.
    pub fn set_page(&mut self, page: u32) {
        self.page = Some(page.max(DEFAULT_PAGE));
    }

    /// Returns the page size, defaulting to [`DEFAULT_LIMIT`].
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Returns true if any text or enum filter is set.
    pub fn is_filtered(&self) -> bool {
        FilterField::TEXT.iter().any(|f| self.text(*f).is_some())
    }

    /// Clears every text and enum filter and resets the page to 1.
    ///
    /// The page size is kept.
    pub fn clear_filters(&mut self) {
        for field in FilterField::TEXT {
            self.unset(field);
        }
        self.page = Some(DEFAULT_PAGE);
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Request parameters in [`FilterField::ALL`] order, skipping unset fields.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        FilterField::ALL
            .into_iter()
            .filter_map(|f| self.get(f).map(|v| (f.key(), v)))
            .collect()
    }

    /// Canonical, order-independent cache key of this filter set.
    ///
    /// Two sets holding the same field/value pairs yield the same key no
    /// matter how they were built.
    pub fn cache_key(&self) -> String {
        let sorted: BTreeMap<&'static str, String> = self.params().into_iter().collect();
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(sorted)
            .finish()
    }

    /// Parses a query string (with or without the leading `?`).
    ///
    /// Unknown keys are ignored, the first occurrence of a key wins, and an
    /// unparsable or zero `page`/`limit` falls back to its default.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut set = Self::new();
        let mut seen = Vec::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let Some(field) = FilterField::from_key(&key) else {
                continue;
            };
            if seen.contains(&field) {
                continue;
            }
            seen.push(field);
            // Lenient on purpose: a bad `page` in a shared link is not an error.
            if set.set(field, value.into_owned()).is_err() {
                set.unset(field);
            }
        }

        set
    }

    /// Renders the query string, omitting fields at their defaults.
    ///
    /// Page 1 and the default page size are left out so the query stays
    /// clean; an empty string is returned for an unfiltered first page.
    pub fn to_query(&self) -> String {
        let pairs = self.params().into_iter().filter(|(key, value)| match *key {
            "page" => *value != DEFAULT_PAGE.to_string(),
            "limit" => *value != DEFAULT_LIMIT.to_string(),
            _ => true,
        });
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }
}

fn parse_positive(field: FilterField, value: &str) -> Result<Option<u32>, CoreError> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(Some(n)),
        _ => Err(CoreError::InvalidValue {
            field: field.key(),
            value: value.to_string(),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
