//! Narrowing of [`DateLike`] inputs to a single canonical instant.

use crate::models::DateLike;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];

/// Narrows a date input to a UTC instant, or `None` when it cannot be used.
///
/// Never fails: unparseable values are logged and reported as `None` so the
/// caller can take its documented fallback path. Nanoseconds on epoch records
/// are ignored; billing works at day granularity.
pub fn normalize(input: &DateLike) -> Option<DateTime<Utc>> {
    match input {
        DateLike::Unknown => None,
        DateLike::Native(date) => Some(*date),
        DateLike::EpochSeconds { seconds, .. } => {
            let date = DateTime::from_timestamp(*seconds, 0);
            if date.is_none() {
                warn!(seconds = *seconds, "Epoch seconds out of range");
            }
            date
        }
        DateLike::Iso(raw) => {
            let date = parse_calendar_date(raw);
            if date.is_none() {
                warn!(input = %raw, "Unparseable date string");
            }
            date
        }
    }
}

/// The UTC calendar day of a normalized date.
pub fn calendar_day(date: Option<DateTime<Utc>>) -> Option<NaiveDate> {
    date.map(|d| d.date_naive())
}

fn parse_calendar_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

/// Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
