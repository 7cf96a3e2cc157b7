//! Human-readable lease durations.
//!
//! Chrono has no year/month/day difference, so the calendar borrowing rules
//! are applied by hand:
//!   - a day underflow borrows the month before the end date's month
//!   - a start day beyond the borrowed month's length is clamped to it
//!   - a month underflow borrows a year

use crate::pricing::dates::{calendar_day, days_in_month};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Calendar-accurate elapsed time between two days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarSpan {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

impl CalendarSpan {
    /// Returns `None` when `end` precedes `start`.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if end < start {
            return None;
        }

        let mut years = end.year() - start.year();
        let mut months = end.month() as i32 - start.month() as i32;
        let mut days = end.day() as i32 - start.day() as i32;

        if days < 0 {
            months -= 1;
            let (prev_year, prev_month) = if end.month() == 1 {
                (end.year() - 1, 12)
            } else {
                (end.year(), end.month() - 1)
            };
            // A start day past the end of the borrowed month counts from its
            // last day, so the day component never goes negative.
            let borrowed = days_in_month(prev_year, prev_month) as i32;
            days = end.day() as i32 + borrowed - (start.day() as i32).min(borrowed);
        }

        if months < 0 {
            years -= 1;
            months += 12;
        }

        Some(Self {
            years,
            months,
            days,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }
}

impl fmt::Display for CalendarSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0 days");
        }
        let parts: Vec<String> = [
            (self.years, "year"),
            (self.months, "month"),
            (self.days, "day"),
        ]
        .into_iter()
        .filter(|(n, _)| *n != 0)
        .map(|(n, unit)| unit_label(n as i64, unit))
        .collect();
        f.write_str(&join_components(&parts))
    }
}

/// Formats a lease duration.
///
/// Uses the calendar span between `start` and `end` when both are usable;
/// otherwise falls back to `days`, where a non-positive count is floored to
/// "1 month" and longer counts use 30-day months.
pub fn format_duration(
    days: i64,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> String {
    if let (Some(start), Some(end)) = (calendar_day(start), calendar_day(end)) {
        match CalendarSpan::between(start, end) {
            Some(span) => return span.to_string(),
            None => debug!(%start, %end, "End date precedes start date; using day count"),
        }
    }
    format_day_count(days)
}

fn format_day_count(days: i64) -> String {
    if days <= 0 {
        return "1 month".to_string();
    }
    if days < 30 {
        return unit_label(days, "day");
    }
    let months = days / 30;
    let remainder = days % 30;
    if remainder == 0 {
        unit_label(months, "month")
    } else {
        format!(
            "{} and {}",
            unit_label(months, "month"),
            unit_label(remainder, "day")
        )
    }
}

fn unit_label(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

fn join_components(parts: &[String]) -> String {
    match parts {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
    }

    #[test]
    fn month_and_days_across_a_leap_february() {
        assert_eq!(
            format_duration(0, at(2024, 1, 1), at(2024, 2, 15)),
            "1 month and 14 days"
        );
    }

    #[test]
    fn day_underflow_borrows_previous_month() {
        // Jan 31 -> Mar 1 2024: borrow February (29 days), counting from Feb 29.
        let span = CalendarSpan::between(
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
        .unwrap();
        assert_eq!(
            span,
            CalendarSpan {
                years: 0,
                months: 1,
                days: 1
            }
        );
    }

    #[test]
    fn day_underflow_matches_simple_borrow_when_start_day_fits() {
        // Mar 20 -> May 5: borrow April (30 days) => 1 month, 15 days.
        assert_eq!(
            format_duration(0, at(2024, 3, 20), at(2024, 5, 5)),
            "1 month and 15 days"
        );
    }

    #[test]
    fn month_underflow_borrows_a_year() {
        assert_eq!(
            format_duration(0, at(2023, 11, 1), at(2025, 1, 1)),
            "1 year and 2 months"
        );
    }

    #[test]
    fn three_components_use_a_comma_list() {
        assert_eq!(
            format_duration(0, at(2023, 1, 10), at(2024, 3, 15)),
            "1 year, 2 months and 5 days"
        );
    }

    #[test]
    fn singular_units() {
        assert_eq!(
            format_duration(0, at(2023, 1, 1), at(2024, 2, 2)),
            "1 year, 1 month and 1 day"
        );
    }

    #[test]
    fn same_day_is_zero_days() {
        assert_eq!(format_duration(90, at(2024, 5, 5), at(2024, 5, 5)), "0 days");
    }

    #[test]
    fn fallback_day_counts() {
        assert_eq!(format_duration(400, None, None), "13 months and 10 days");
        assert_eq!(format_duration(0, None, None), "1 month");
        assert_eq!(format_duration(-7, None, None), "1 month");
        assert_eq!(format_duration(1, None, None), "1 day");
        assert_eq!(format_duration(29, None, None), "29 days");
        assert_eq!(format_duration(30, None, None), "1 month");
        assert_eq!(format_duration(90, None, None), "3 months");
        assert_eq!(format_duration(31, None, None), "1 month and 1 day");
    }

    #[test]
    fn one_missing_date_uses_day_count() {
        assert_eq!(format_duration(60, at(2024, 1, 1), None), "2 months");
    }

    #[test]
    fn reversed_range_uses_day_count() {
        assert_eq!(format_duration(45, at(2024, 3, 1), at(2024, 1, 1)), "1 month and 15 days");
    }
}
