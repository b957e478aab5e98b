//! Display formatting helpers.

use chrono::{DateTime, Local, SecondsFormat, Utc};

/// Decimal places used when the locator writes coordinates into the form.
pub const COORDINATE_DECIMAL_PLACES: usize = 8;

/// Format a coordinate with a fixed number of decimal places.
pub fn format_coordinate(value: f64, decimal_places: usize) -> String {
    format!("{value:.decimal_places$}")
}

/// Canonical machine-readable timestamp, e.g. `2026-10-19T14:03:07.512Z`.
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Brazilian display form `dd/mm/yyyy hh:mm` in local time.
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}
