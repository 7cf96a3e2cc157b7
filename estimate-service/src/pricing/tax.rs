//! VAT on lease subtotals.

use rust_decimal::Decimal;
use serde::Serialize;

/// 12% VAT.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxBreakdown {
    pub tax: Decimal,
    pub total: Decimal,
}

/// `tax = subtotal * rate`, `total = subtotal + tax`. Unrounded.
///
/// Figures beyond `Decimal`'s range clamp to its bounds; use
/// [`checked_apply_tax`] to detect that.
pub fn apply_tax(subtotal: Decimal, rate: Decimal) -> TaxBreakdown {
    checked_apply_tax(subtotal, rate).unwrap_or_else(|| {
        let tax = subtotal.saturating_mul(rate);
        TaxBreakdown {
            tax,
            total: subtotal.saturating_add(tax),
        }
    })
}

/// [`apply_tax`], or `None` if either figure overflows.
pub fn checked_apply_tax(subtotal: Decimal, rate: Decimal) -> Option<TaxBreakdown> {
    let tax = subtotal.checked_mul(rate)?;
    let total = subtotal.checked_add(tax)?;
    Some(TaxBreakdown { tax, total })
}

/// Whether `rate` is usable as a tax rate (a fraction between 0 and 1).
pub fn is_valid_rate(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_percent_of_one_thousand() {
        let result = apply_tax(Decimal::from(1000), DEFAULT_TAX_RATE);
        assert_eq!(result.tax, Decimal::from(120));
        assert_eq!(result.total, Decimal::from(1120));
    }

    #[test]
    fn default_rate_is_twelve_percent() {
        assert_eq!(DEFAULT_TAX_RATE.to_string(), "0.12");
    }

    #[test]
    fn total_equals_subtotal_times_one_plus_rate() {
        let subtotal: Decimal = "45123.456789".parse().unwrap();
        let rate: Decimal = "0.075".parse().unwrap();
        let result = apply_tax(subtotal, rate);
        assert_eq!(result.total, subtotal * (Decimal::ONE + rate));
    }

    #[test]
    fn zero_rate_adds_nothing() {
        let result = apply_tax(Decimal::from(999), Decimal::ZERO);
        assert_eq!(result.tax, Decimal::ZERO);
        assert_eq!(result.total, Decimal::from(999));
    }

    #[test]
    fn subtotal_near_the_decimal_limit_clamps() {
        assert_eq!(checked_apply_tax(Decimal::MAX, DEFAULT_TAX_RATE), None);

        let result = apply_tax(Decimal::MAX, DEFAULT_TAX_RATE);
        assert_eq!(result.total, Decimal::MAX);
        assert!(result.tax > Decimal::ZERO);
    }

    #[test]
    fn rate_bounds() {
        assert!(is_valid_rate(Decimal::ZERO));
        assert!(is_valid_rate(Decimal::ONE));
        assert!(!is_valid_rate(Decimal::from(2)));
        assert!(!is_valid_rate("-0.01".parse().unwrap()));
    }
}
