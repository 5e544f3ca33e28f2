//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use contratos_core::{Contrato, ContratosResponse};
use contratos_store::{Notification, SelectedFile};
use serde::{Serialize, Serializer};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a page of contracts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOutput<'a> {
    pub items: &'a [Contrato],
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    /// Shareable query string of the view.
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub fetched_at: Option<DateTime<Utc>>,
}

/// JSON output for an upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutput<'a> {
    pub file: &'a SelectedFile,
    pub notification: &'a Notification,
}

/// JSON output for an error.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput<'a> {
    pub error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

// ============================================================================
// Serialization helpers
// ============================================================================

#[allow(clippy::ref_option)]
fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Serializes any value, compact or pretty.
    pub fn format<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(output)
    }

    /// Formats a page of contracts.
    pub fn format_page(
        &self,
        page: &ContratosResponse,
        query: &str,
        fetched_at: Option<DateTime<Utc>>,
    ) -> Result<String> {
        let pagination = page.pagination();
        self.format(&ListOutput {
            items: &page.items,
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages,
            has_previous: pagination.can_go_back(),
            has_next: pagination.can_go_forward(),
            query,
            fetched_at,
        })
    }

    /// Formats an upload outcome.
    pub fn format_upload(&self, file: &SelectedFile, notification: &Notification) -> Result<String> {
        self.format(&UploadOutput { file, notification })
    }

    /// Formats an error.
    pub fn format_error(&self, error: &str, status_code: Option<u16>) -> Result<String> {
        self.format(&ErrorOutput { error, status_code })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_error_output_omits_missing_status() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format_error("boom", None).unwrap();
        assert_eq!(output, r#"{"error":"boom"}"#);

        let output = formatter.format_error("Unauthorized", Some(401)).unwrap();
        assert_eq!(output, r#"{"error":"Unauthorized","statusCode":401}"#);
    }
}
