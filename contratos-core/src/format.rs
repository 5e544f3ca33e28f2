//! Display helpers for contract values.
//!
//! Values are rendered the way the dashboard shows them to Brazilian users:
//! currency as `R$ 1.234,56` and dates as `dd/mm/yyyy`. Inputs that cannot
//! be parsed are returned unchanged.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats a decimal string as Brazilian reais.
///
/// ```
/// use contratos_core::format::format_currency_brl;
///
/// assert_eq!(format_currency_brl("1234.5"), "R$ 1.234,50");
/// ```
pub fn format_currency_brl(value: &str) -> String {
    let Ok(amount) = value.trim().parse::<f64>() else {
        return value.to_string();
    };
    if !amount.is_finite() {
        return value.to_string();
    }

    let cents = (amount.abs() * 100.0).round();
    let fixed = format!("{cents:.0}");
    let (int_digits, frac) = if fixed.len() > 2 {
        fixed.split_at(fixed.len() - 2)
    } else {
        ("0", fixed.as_str())
    };
    let frac = format!("{frac:0>2}");

    let sign = if amount < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{sign}R$ {},{frac}", group_thousands(int_digits))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Formats an ISO-8601 date or timestamp as `dd/mm/yyyy`.
///
/// The calendar date is taken as written; no timezone conversion is
/// applied, so `2024-01-15` and `2024-01-15T00:00:00Z` both render as
/// `15/01/2024`.
pub fn format_date_br(value: &str) -> String {
    let value = value.trim();
    let date = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"));

    match date {
        Ok(d) => d.format("%d/%m/%Y").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Formats a byte count as kilobytes with two decimals (`"1.50 KB"`).
#[allow(clippy::cast_precision_loss)]
pub fn format_size_kb(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}
