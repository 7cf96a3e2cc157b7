//! Cost estimate pricing engine.
//!
//! Pure, synchronous functions: date normalization, duration labels,
//! month-by-month proration, VAT, and site grouping. Nothing here performs
//! I/O or panics on bad input; fallbacks are logged and surfaced as
//! [`PricingWarning`]s on the summary.

pub mod dates;
pub mod display;
pub mod duration;
pub mod grouping;
pub mod proration;
pub mod summary;
pub mod tax;

pub use dates::{days_in_month, is_leap_year, normalize};
pub use display::{format_amount, format_date, round_money};
pub use duration::{format_duration, CalendarSpan};
pub use grouping::{
    group_by_site, ungrouped_items, AssociationRule, SiteGroup, SINGLE_SITE_LABEL,
};
pub use proration::{prorate, prorate_breakdown, FlatRateReason, MonthSlice, Proration};
pub use summary::{
    summarize, DateField, EstimateSummary, PricingOptions, PricingWarning, RentalLine,
    SiteSummary,
};
pub use tax::{apply_tax, checked_apply_tax, TaxBreakdown, DEFAULT_TAX_RATE};
