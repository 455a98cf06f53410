//! Field parsing helpers for incident CSV rows.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parses a dataset timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` (both with optional
/// fractional seconds), `YYYY-MM-DD HH:MM`, and a bare `YYYY-MM-DD`, which
/// is read as midnight.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(start_of_day)
}

/// Midnight at the start of `date`.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

/// Trims a free-text label, mapping a missing value to an empty string.
#[must_use]
pub fn clean_label(value: Option<String>) -> String {
    value.map(|v| v.trim().to_owned()).unwrap_or_default()
}
