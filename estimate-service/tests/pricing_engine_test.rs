//! Behavioural tests for the pricing engine's public API.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use estimate_service::models::{CostEstimate, CostEstimateLineItem, DateLike, MAX_LINE_AMOUNT};
use estimate_service::pricing::{
    apply_tax, days_in_month, format_duration, group_by_site, normalize, prorate, summarize,
    AssociationRule, PricingOptions, PricingWarning, DEFAULT_TAX_RATE, SINGLE_SITE_LABEL,
};
use rust_decimal::Decimal;

fn at(y: i32, m: u32, d: u32) -> Option<DateTime<Utc>> {
    Some(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
}

fn rate() -> Decimal {
    "125000.50".parse().unwrap()
}

fn approx_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < Decimal::new(1, 12)
}

#[test]
fn same_day_range_bills_the_rate() {
    let mut day = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
    for _ in 0..70 {
        let d = Some(day.and_hms_opt(9, 0, 0).unwrap().and_utc());
        assert_eq!(prorate(rate(), d, d), rate());
        day += Duration::days(1);
    }
}

#[test]
fn whole_calendar_months_bill_the_rate() {
    for (start, end) in [
        (at(2024, 2, 1), at(2024, 2, 29)),
        (at(2023, 2, 1), at(2023, 2, 28)),
        (at(2024, 4, 1), at(2024, 4, 30)),
        (at(2024, 7, 1), at(2024, 7, 31)),
    ] {
        assert!(approx_eq(prorate(rate(), start, end), rate()));
    }
}

#[test]
fn splitting_a_range_double_counts_only_the_split_day() {
    let start = at(2024, 1, 13);
    let end = at(2024, 8, 2);
    let whole = prorate(rate(), start, end);

    for split in [at(2024, 1, 20), at(2024, 2, 29), at(2024, 3, 1), at(2024, 6, 30)] {
        let left = prorate(rate(), start, split);
        let right = prorate(rate(), split, end);
        let split_day = split.unwrap().date_naive();
        // Both halves bill the split day; remove one day's worth of it.
        assert!(
            approx_eq(left + right - daily_rate_on(split_day), whole),
            "split at {split_day}"
        );
    }
}

/// One day's share of the monthly rate on `day`.
fn daily_rate_on(day: NaiveDate) -> Decimal {
    let dim = days_in_month(day.year(), day.month());
    rate() / Decimal::from(dim)
}

#[test]
fn tax_on_one_thousand() {
    let result = apply_tax(Decimal::from(1000), DEFAULT_TAX_RATE);
    assert_eq!(result.tax, Decimal::from(120));
    assert_eq!(result.total, Decimal::from(1120));
}

#[test]
fn duration_examples() {
    assert_eq!(
        format_duration(0, at(2024, 1, 1), at(2024, 2, 15)),
        "1 month and 14 days"
    );
    assert_eq!(format_duration(400, None, None), "13 months and 10 days");
    assert_eq!(format_duration(0, None, None), "1 month");
}

#[test]
fn pure_functions_are_repeatable() {
    let a = (
        prorate(rate(), at(2024, 1, 13), at(2025, 3, 3)),
        apply_tax(rate(), DEFAULT_TAX_RATE),
        format_duration(17, at(2024, 1, 13), at(2025, 3, 3)),
    );
    let b = (
        prorate(rate(), at(2024, 1, 13), at(2025, 3, 3)),
        apply_tax(rate(), DEFAULT_TAX_RATE),
        format_duration(17, at(2024, 1, 13), at(2025, 3, 3)),
    );
    assert_eq!(a, b);
}

fn item(id: &str, category: &str, description: &str) -> CostEstimateLineItem {
    CostEstimateLineItem {
        id: id.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        unit_price: Decimal::ZERO,
        quantity: 1,
        total: Decimal::ZERO,
        specs: None,
    }
}

#[test]
fn grouping_falls_back_to_single_site() {
    let items = vec![item("x1", "Misc", "")];
    let groups = group_by_site(&items, AssociationRule::Substring);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].label, SINGLE_SITE_LABEL);
    assert_eq!(groups[0].items, items);
}

#[test]
fn grouping_associates_derived_ids() {
    let items = vec![
        item("site-1", "Billboard Rental", "Site A"),
        item("site-1-install", "Fee", ""),
    ];
    let groups = group_by_site(&items, AssociationRule::Substring);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].label, "Site A");
    assert_eq!(groups[0].items.len(), 2);
}

#[test]
fn epoch_record_normalizes_exactly() {
    let input = DateLike::EpochSeconds {
        seconds: 1_700_000_000,
        nanoseconds: None,
    };
    assert_eq!(
        normalize(&input),
        Some(Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap())
    );
    assert_eq!(normalize(&DateLike::from("not-a-date")), None);
}

fn priced(id: &str, category: &str, description: &str, amount: Decimal) -> CostEstimateLineItem {
    CostEstimateLineItem {
        unit_price: amount,
        total: amount,
        ..item(id, category, description)
    }
}

#[test]
fn overlapping_site_groups_do_not_inflate_the_subtotal() {
    let estimate = CostEstimate {
        line_items: vec![
            priced("1", "Billboard Rental", "Site A", Decimal::from(1000)),
            priced("12", "Billboard Rental", "Site B", Decimal::from(1000)),
            priced("12-install", "Installation", "Crew", Decimal::from(500)),
        ],
        start_date: DateLike::from("2024-01-01"),
        end_date: DateLike::from("2024-01-31"),
        ..Default::default()
    };

    let summary = summarize(&estimate, &PricingOptions::default());

    let site_sum: Decimal = summary.sites.iter().map(|s| s.subtotal).sum();
    assert_eq!(site_sum, summary.subtotal);
    assert_eq!(summary.subtotal, Decimal::from(2500));
    assert!(summary
        .warnings
        .contains(&PricingWarning::OverlappingGroups { count: 2 }));
}

#[test]
fn largest_accepted_amount_prorates_without_overflow() {
    let amount = prorate(MAX_LINE_AMOUNT, at(2024, 1, 17), at(2026, 2, 14));
    assert!(amount > MAX_LINE_AMOUNT * Decimal::from(24));
    assert!(amount < MAX_LINE_AMOUNT * Decimal::from(26));
}

#[test]
fn decimal_limit_rate_does_not_panic() {
    let rate = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
    let amount = prorate(rate, at(2024, 1, 1), at(2024, 1, 20));
    assert!(amount > Decimal::ZERO && amount < rate);

    let taxed = apply_tax(Decimal::MAX, DEFAULT_TAX_RATE);
    assert_eq!(taxed.total, Decimal::MAX);
}
