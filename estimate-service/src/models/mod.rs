//! Domain models for estimate-service.

mod cost_estimate;
mod date_like;
mod line_item;

pub use cost_estimate::CostEstimate;
pub use date_like::{DateLike, ToDate};
pub use line_item::{CostEstimateLineItem, LineItemSpecs, MAX_LINE_AMOUNT, RENTAL_CATEGORY_MARKER};
