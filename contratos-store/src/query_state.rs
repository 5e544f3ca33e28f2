//! Query state binding.
//!
//! [`QueryBinding`] holds the list view's filters in the shape of a
//! shareable query string. Reading a field yields `""` when it is unset,
//! and changing any filter other than `page` sends the view back to the
//! first page in the same update.
//!
//! [`ViewState`] is the persisted form of a binding, so a later invocation
//! resumes the last view.

use std::path::Path;

use chrono::{DateTime, Utc};
use contratos_core::{CoreError, DEFAULT_LIMIT, DEFAULT_PAGE, FilterField, FilterSet, Pagination};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::persistence::{load_json_or_default, save_json};

// ============================================================================
// Query Binding
// ============================================================================

/// Current list filters, bound to a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBinding {
    filters: FilterSet,
    default_limit: u32,
}

impl Default for QueryBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBinding {
    /// Creates a binding on the first page with no filters.
    pub fn new() -> Self {
        Self {
            filters: FilterSet::new(),
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Parses a query string. Malformed values fall back to defaults.
    pub fn from_query(query: &str) -> Self {
        Self {
            filters: FilterSet::from_query(query),
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Uses `limit` as the page size when the query does not name one.
    #[must_use]
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    /// Returns a field's value, or `""` when unset.
    pub fn get(&self, field: FilterField) -> String {
        match field {
            FilterField::Page => self.page().to_string(),
            FilterField::Limit => self.limit().to_string(),
            _ => self.filters.get(field).unwrap_or_default(),
        }
    }

    /// Sets a field. An empty value clears it.
    ///
    /// Any field other than `page` also resets the page to 1.
    ///
    /// # Errors
    ///
    /// Returns an error when `page` or `limit` is not a positive integer;
    /// the binding is left unchanged.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) -> Result<(), CoreError> {
        let mut next = self.filters.clone();
        next.set(field, value)?;
        if !field.is_page() {
            next.page = None;
        }
        debug!(field = %field, "Query field changed");
        self.filters = next;
        Ok(())
    }

    /// Current page, 1-based.
    pub fn page(&self) -> u32 {
        self.filters.page()
    }

    /// Moves to `page` (clamped to at least 1) without touching filters.
    pub fn set_page(&mut self, page: u32) {
        if page <= DEFAULT_PAGE {
            self.filters.page = None;
        } else {
            self.filters.set_page(page);
        }
    }

    /// Effective page size.
    pub fn limit(&self) -> u32 {
        self.filters.limit.unwrap_or(self.default_limit)
    }

    /// Resets every filter and the page in one update. The page size is kept.
    pub fn clear_filters(&mut self) {
        self.filters.clear_filters();
        self.filters.page = None;
    }

    /// Returns true if any filter is set.
    pub fn is_filtered(&self) -> bool {
        self.filters.is_filtered()
    }

    /// The filter set to request, with page and limit always present.
    pub fn filters(&self) -> FilterSet {
        let mut filters = self.filters.clone();
        filters.page = Some(self.page());
        filters.limit = Some(self.limit());
        filters
    }

    /// The shareable query string. Defaults are omitted.
    pub fn query_string(&self) -> String {
        self.filters.to_query()
    }

    /// Advances one page if `total_pages` allows it. Returns whether it moved.
    pub fn next_page(&mut self, total_pages: u32) -> bool {
        match Pagination::new(self.page(), total_pages).next() {
            Some(page) => {
                self.set_page(page);
                true
            }
            None => false,
        }
    }

    /// Goes back one page unless already on the first. Returns whether it moved.
    pub fn previous_page(&mut self) -> bool {
        match Pagination::new(self.page(), self.page()).previous() {
            Some(page) => {
                self.set_page(page);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Persisted View
// ============================================================================

/// Last list view, saved between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    /// Query string of the view.
    pub query: String,
    /// Total pages reported by the last successful fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    /// When the view was saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl ViewState {
    /// Captures a binding.
    pub fn capture(binding: &QueryBinding, total_pages: Option<u32>) -> Self {
        Self {
            query: binding.query_string(),
            total_pages,
            saved_at: Some(Utc::now()),
        }
    }

    /// Rebuilds the binding.
    pub fn binding(&self) -> QueryBinding {
        QueryBinding::from_query(&self.query)
    }

    /// Loads the view, or an empty one if missing or unreadable.
    pub async fn load(path: &Path) -> Self {
        load_json_or_default(path).await
    }

    /// Saves the view.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await
    }
}

// ============================================================================
// Tests
// ============================================================================
