use crate::error::{LedgerSynthError, Result};
use chrono::NaiveDate;

/// Date format used by ledger headers and entry definition windows.
pub const LEDGER_DATE_FORMAT: &str = "%Y/%m/%d";

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a date in `YYYY/MM/DD` form, falling back to ISO `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, LEDGER_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT))
        .map_err(|_| {
            LedgerSynthError::DateError(format!(
                "Invalid date '{}'. Expected YYYY/MM/DD or YYYY-MM-DD",
                value
            ))
        })
}

pub fn format_ledger_date(date: NaiveDate) -> String {
    date.format(LEDGER_DATE_FORMAT).to_string()
}

/// Formats an amount the way ledger tooling reads it: symbol first, two decimals.
/// Negative values keep the sign after the symbol (`$-5.00`).
pub fn format_currency(symbol: &str, value: f64) -> String {
    format!("{}{:.2}", symbol, value)
}

/// Whether the inclusive windows `[a_start, a_end]` and `[b_start, b_end]` share a day.
/// Open bounds are unbounded.
pub fn windows_overlap(
    a_start: Option<NaiveDate>,
    a_end: Option<NaiveDate>,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    let starts_before_b_ends = a_start.map_or(true, |s| s <= b_end);
    let ends_after_b_starts = a_end.map_or(true, |e| e >= b_start);
    starts_before_b_ends && ends_after_b_starts
}
