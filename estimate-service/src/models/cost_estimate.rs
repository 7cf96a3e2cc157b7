//! Cost estimate model for estimate-service.

use crate::models::{CostEstimateLineItem, DateLike};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A quotation for one or more billboard sites over a lease period.
///
/// Built upstream by the sales workflow and handed to the pricing engine by
/// value; the engine never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_estimate_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub line_items: Vec<CostEstimateLineItem>,
    #[serde(default)]
    pub start_date: DateLike,
    #[serde(default)]
    pub end_date: DateLike,
    /// Display fallback when the dates cannot be used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
}
