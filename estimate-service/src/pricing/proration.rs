//! Pro-rata lease pricing across calendar months of differing lengths.

use crate::pricing::dates::{calendar_day, days_in_month};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

/// Contribution of one calendar month to a prorated amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSlice {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub days_billed: u32,
    pub amount: Decimal,
}

/// Why a monthly rate was billed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatRateReason {
    DatesUnavailable,
    SameDay,
    ReversedRange,
}

/// Prorated amount with its per-month breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proration {
    pub amount: Decimal,
    pub slices: Vec<MonthSlice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat_rate: Option<FlatRateReason>,
    /// The month amounts summed past `Decimal::MAX`; `amount` is clamped.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub overflowed: bool,
}

impl Proration {
    fn flat(monthly_rate: Decimal, reason: FlatRateReason) -> Self {
        Self {
            amount: monthly_rate,
            slices: Vec::new(),
            flat_rate: Some(reason),
            overflowed: false,
        }
    }

    pub fn is_prorated(&self) -> bool {
        self.flat_rate.is_none()
    }
}

/// Bills `monthly_rate` for the days between `start` and `end` inclusive.
///
/// Each month contributes `monthly_rate / days_in_month` per day occupied.
/// The full rate is returned when either date is missing, when both fall on
/// the same day, or when `end` precedes `start`. No rounding is applied.
pub fn prorate(
    monthly_rate: Decimal,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Decimal {
    prorate_breakdown(monthly_rate, start, end).amount
}

/// [`prorate`] with the month slices that make up the amount.
pub fn prorate_breakdown(
    monthly_rate: Decimal,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Proration {
    let (Some(start), Some(end)) = (calendar_day(start), calendar_day(end)) else {
        warn!(%monthly_rate, "Lease dates unavailable; billing the monthly rate unprorated");
        return Proration::flat(monthly_rate, FlatRateReason::DatesUnavailable);
    };

    if start == end {
        return Proration::flat(monthly_rate, FlatRateReason::SameDay);
    }

    if end < start {
        warn!(%start, %end, "Lease end precedes start; billing the monthly rate unprorated");
        return Proration::flat(monthly_rate, FlatRateReason::ReversedRange);
    }

    let slices: Vec<MonthSlice> = months_spanned(start, end)
        .map(|(year, month)| {
            let dim = days_in_month(year, month);
            let first = if (year, month) == (start.year(), start.month()) {
                start.day()
            } else {
                1
            };
            let last = if (year, month) == (end.year(), end.month()) {
                end.day()
            } else {
                dim
            };
            let days_billed = last - first + 1;
            MonthSlice {
                year,
                month,
                days_in_month: dim,
                days_billed,
                amount: month_share(monthly_rate, days_billed, dim),
            }
        })
        .collect();

    let (amount, overflowed) = match slices
        .iter()
        .try_fold(Decimal::ZERO, |acc, s| acc.checked_add(s.amount))
    {
        Some(amount) => (amount, false),
        None => {
            warn!(
                %monthly_rate, %start, %end,
                "Prorated amount exceeds the decimal range; clamping"
            );
            let clamped = slices
                .iter()
                .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.amount));
            (clamped, true)
        }
    };
    debug!(%start, %end, months = slices.len(), %amount, "Prorated lease amount");

    Proration {
        amount,
        slices,
        flat_rate: None,
        overflowed,
    }
}

/// `rate * days / dim`, dividing first when the product would overflow.
fn month_share(rate: Decimal, days: u32, dim: u32) -> Decimal {
    let (days, dim) = (Decimal::from(days), Decimal::from(dim));
    match rate.checked_mul(days) {
        Some(scaled) => scaled / dim,
        None => (rate / dim).saturating_mul(days),
    }
}

/// `(year, month)` pairs from `start`'s month through `end`'s month.
fn months_spanned(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = (i32, u32)> {
    let first = start.year() * 12 + start.month0() as i32;
    let last = end.year() * 12 + end.month0() as i32;
    (first..=last).map(|index| (index.div_euclid(12), index.rem_euclid(12) as u32 + 1))
}
