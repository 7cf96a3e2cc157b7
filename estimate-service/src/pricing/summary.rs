//! Figures shown on a cost estimate document, computed from one estimate.

use crate::models::{CostEstimate, CostEstimateLineItem};
use crate::pricing::dates::{calendar_day, normalize};
use crate::pricing::duration::format_duration;
use crate::pricing::grouping::{group_by_site, ungrouped_items, AssociationRule, SiteGroup};
use crate::pricing::proration::{prorate_breakdown, FlatRateReason, Proration};
use crate::pricing::tax::{apply_tax, checked_apply_tax, TaxBreakdown, DEFAULT_TAX_RATE};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{instrument, warn};

/// Knobs that vary by deployment or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingOptions {
    pub tax_rate: Decimal,
    pub association: AssociationRule,
}

impl Default for PricingOptions {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            association: AssociationRule::default(),
        }
    }
}

/// A fallback the engine took instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingWarning {
    /// A date was supplied but could not be read.
    InvalidDate { field: DateField },
    /// Billing used monthly rates as-is and the duration came from the day count.
    DatesUnavailable,
    ReversedRange,
    UngroupedItems { count: usize },
    /// Items listed under more than one site; each is billed once.
    OverlappingGroups { count: usize },
    /// A figure left `Decimal`'s range and was clamped.
    AmountOverflow,
}

impl PricingWarning {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            PricingWarning::InvalidDate { .. } => "invalid_date",
            PricingWarning::DatesUnavailable => "dates_unavailable",
            PricingWarning::ReversedRange => "reversed_range",
            PricingWarning::UngroupedItems { .. } => "ungrouped_items",
            PricingWarning::OverlappingGroups { .. } => "overlapping_groups",
            PricingWarning::AmountOverflow => "amount_overflow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalLine {
    pub item_id: String,
    pub monthly_rate: Decimal,
    pub quantity: u32,
    pub proration: Proration,
    /// `proration.amount * quantity`.
    pub lease_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    pub label: String,
    /// Every item listed under the site, including ones billed elsewhere.
    pub items: Vec<CostEstimateLineItem>,
    pub rentals: Vec<RentalLine>,
    pub lease_amount: Decimal,
    pub ancillary_total: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateSummary {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration_label: String,
    pub prorated: bool,
    pub tax_rate: Decimal,
    pub sites: Vec<SiteSummary>,
    /// Sum of every line item's `total`, grouped or not.
    pub items_total: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub warnings: Vec<PricingWarning>,
}

/// Prices `estimate` for display.
///
/// Rental rows are billed at their prorated monthly rate times quantity;
/// other rows in a site group contribute their `total`. Every input row is
/// billed at most once even when it is listed under several sites. Tax is
/// applied per site and to the estimate subtotal. Nothing is rounded.
#[instrument(skip_all, fields(items = estimate.line_items.len()))]
pub fn summarize(estimate: &CostEstimate, options: &PricingOptions) -> EstimateSummary {
    let mut warnings = Vec::new();

    let start = normalize(&estimate.start_date);
    let end = normalize(&estimate.end_date);
    if start.is_none() && !estimate.start_date.is_unknown() {
        warnings.push(PricingWarning::InvalidDate {
            field: DateField::StartDate,
        });
    }
    if end.is_none() && !estimate.end_date.is_unknown() {
        warnings.push(PricingWarning::InvalidDate {
            field: DateField::EndDate,
        });
    }

    let duration_label = format_duration(estimate.duration_days.unwrap_or(0), start, end);

    let items = &estimate.line_items;
    let groups = group_by_site(items, options.association);
    let ungrouped = ungrouped_items(items, &groups).len();
    if ungrouped > 0 {
        warn!(count = ungrouped, "Line items matched no site group");
        warnings.push(PricingWarning::UngroupedItems { count: ungrouped });
    }
    let overlapping = overlapping_items(items.len(), &groups);
    if overlapping > 0 {
        warn!(count = overlapping, "Line items listed under more than one site");
        warnings.push(PricingWarning::OverlappingGroups { count: overlapping });
    }

    let billed = billing_positions(items, &groups);
    let mut ledger = Ledger::default();
    let sites: Vec<SiteSummary> = groups
        .into_iter()
        .zip(billed)
        .map(|(group, billed)| {
            summarize_site(group, &billed, items, start, end, options.tax_rate, &mut ledger)
        })
        .collect();

    if let Some(reason) = sites
        .iter()
        .flat_map(|s| s.rentals.iter())
        .find_map(|r| r.proration.flat_rate)
    {
        match reason {
            FlatRateReason::DatesUnavailable => warnings.push(PricingWarning::DatesUnavailable),
            FlatRateReason::ReversedRange => warnings.push(PricingWarning::ReversedRange),
            FlatRateReason::SameDay => {}
        }
    } else if start.is_none() || end.is_none() {
        warnings.push(PricingWarning::DatesUnavailable);
    }

    let prorated = sites
        .iter()
        .flat_map(|s| s.rentals.iter())
        .any(|r| r.proration.is_prorated());
    let items_total = ledger.sum(items.iter().map(|i| i.total));
    let subtotal = ledger.sum(sites.iter().map(|s| s.subtotal));
    let taxed = ledger.tax(subtotal, options.tax_rate);

    if ledger.overflowed {
        warn!("Estimate figures exceed the decimal range; amounts are clamped");
        warnings.push(PricingWarning::AmountOverflow);
    }

    EstimateSummary {
        start_date: calendar_day(start),
        end_date: calendar_day(end),
        duration_label,
        prorated,
        tax_rate: options.tax_rate,
        sites,
        items_total,
        subtotal,
        tax: taxed.tax,
        total: taxed.total,
        warnings,
    }
}

/// Positions each group bills, parallel to `groups`.
///
/// A rental row is billed by the group named after it; any other row by the
/// first group that lists it.
fn billing_positions(items: &[CostEstimateLineItem], groups: &[SiteGroup]) -> Vec<Vec<usize>> {
    let mut claimed = vec![false; items.len()];
    let mut billed = Vec::with_capacity(groups.len());

    for group in groups {
        let mut positions = Vec::new();
        for &position in &group.positions {
            let item = &items[position];
            let owns = !item.is_rental() || item.description == group.label;
            if owns && !claimed[position] {
                claimed[position] = true;
                positions.push(position);
            }
        }
        billed.push(positions);
    }

    billed
}

/// Number of input rows listed under more than one group.
fn overlapping_items(len: usize, groups: &[SiteGroup]) -> usize {
    let mut listings = vec![0usize; len];
    for position in groups.iter().flat_map(|g| g.positions.iter()) {
        listings[*position] += 1;
    }
    listings.iter().filter(|&&n| n > 1).count()
}

/// Money arithmetic that clamps at `Decimal`'s bounds and records that it did.
#[derive(Debug, Default)]
struct Ledger {
    overflowed: bool,
}

impl Ledger {
    fn add(&mut self, a: Decimal, b: Decimal) -> Decimal {
        a.checked_add(b).unwrap_or_else(|| {
            self.overflowed = true;
            a.saturating_add(b)
        })
    }

    fn mul(&mut self, a: Decimal, b: Decimal) -> Decimal {
        a.checked_mul(b).unwrap_or_else(|| {
            self.overflowed = true;
            a.saturating_mul(b)
        })
    }

    fn sum(&mut self, values: impl IntoIterator<Item = Decimal>) -> Decimal {
        values
            .into_iter()
            .fold(Decimal::ZERO, |acc, value| self.add(acc, value))
    }

    fn tax(&mut self, subtotal: Decimal, rate: Decimal) -> TaxBreakdown {
        checked_apply_tax(subtotal, rate).unwrap_or_else(|| {
            self.overflowed = true;
            apply_tax(subtotal, rate)
        })
    }
}

fn summarize_site(
    group: SiteGroup,
    billed: &[usize],
    items: &[CostEstimateLineItem],
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    tax_rate: Decimal,
    ledger: &mut Ledger,
) -> SiteSummary {
    let billed: Vec<&CostEstimateLineItem> = billed.iter().map(|&p| &items[p]).collect();

    let rentals: Vec<RentalLine> = billed
        .iter()
        .filter(|item| item.is_rental())
        .map(|item| {
            let proration = prorate_breakdown(item.unit_price, start, end);
            if proration.overflowed {
                ledger.overflowed = true;
            }
            RentalLine {
                item_id: item.id.clone(),
                monthly_rate: item.unit_price,
                quantity: item.quantity,
                lease_amount: ledger.mul(proration.amount, Decimal::from(item.quantity)),
                proration,
            }
        })
        .collect();

    let lease_amount = ledger.sum(rentals.iter().map(|r| r.lease_amount));
    let ancillary_total = ledger.sum(
        billed
            .iter()
            .filter(|item| !item.is_rental())
            .map(|item| item.total),
    );
    let subtotal = ledger.add(lease_amount, ancillary_total);
    let taxed = ledger.tax(subtotal, tax_rate);

    SiteSummary {
        label: group.label,
        items: group.items,
        rentals,
        lease_amount,
        ancillary_total,
        subtotal,
        tax: taxed.tax,
        total: taxed.total,
    }
}
