//! Line item model for estimate-service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Category marker that identifies a site rental row.
pub const RENTAL_CATEGORY_MARKER: &str = "Billboard Rental";

/// Largest accepted `unitPrice` or `total`: 10^15.
pub const MAX_LINE_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// One billable row on a cost estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimateLineItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub category: String,
    /// Site name for rental rows.
    #[serde(default)]
    pub description: String,
    /// Monthly rate for rental rows.
    #[serde(default)]
    #[validate(custom(function = "billable_amount"))]
    pub unit_price: Decimal,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[serde(default)]
    #[validate(custom(function = "billable_amount"))]
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<LineItemSpecs>,
}

/// Face dimensions in feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemSpecs {
    #[serde(default)]
    pub height: Option<Decimal>,
    #[serde(default)]
    pub width: Option<Decimal>,
}

fn default_quantity() -> u32 {
    1
}

fn billable_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative"));
    }
    if *value > MAX_LINE_AMOUNT {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}

impl CostEstimateLineItem {
    pub fn is_rental(&self) -> bool {
        self.category.contains(RENTAL_CATEGORY_MARKER)
    }
}

impl LineItemSpecs {
    /// "10ft (H) x 20ft (W)"; a missing side renders as "-".
    pub fn label(&self) -> String {
        fn side(value: Option<Decimal>) -> String {
            value
                .map(|v| format!("{}ft", v.normalize()))
                .unwrap_or_else(|| "-".to_string())
        }
        format!("{} (H) x {} (W)", side(self.height), side(self.width))
    }
}
