//! Human-readable publish dates.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Render a feed date string as `"<Month> <day>, <year>"`.
///
/// Accepts RFC 3339 timestamps, WordPress-style local timestamps
/// (`2021-05-03T10:00:00`, optionally with fractional seconds or a space
/// separator) and bare dates. The calendar date is taken as
/// written, without converting between time zones. Empty or unparseable
/// input yields an empty string so the caller can drop the date line.
pub fn format_date(date_text: &str) -> String {
    let text = date_text.trim();
    if text.is_empty() {
        return String::new();
    }

    match parse_date(text) {
        Some(date) => format!(
            "{} {}, {}",
            MONTH_NAMES[date.month0() as usize],
            date.day(),
            date.year()
        ),
        None => String::new(),
    }
}

/// Zone-less timestamps; `%.f` also accepts a missing fraction.
const LOCAL_TIMESTAMPS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    LOCAL_TIMESTAMPS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
}
