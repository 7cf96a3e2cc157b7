//! Cost estimate pricing endpoint used by document preview and PDF export.

use crate::models::CostEstimate;
use crate::pricing::{
    format_amount, format_date, summarize, tax, EstimateSummary, PricingOptions, PricingWarning,
    SiteSummary,
};
use crate::services::metrics::{
    HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION, PRICING_FALLBACKS_TOTAL, SITES_PER_ESTIMATE,
    SUMMARIES_TOTAL,
};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tracing::{info, instrument, warn};
use validator::Validate;

const ROUTE: &str = "summarize_estimate";

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeEstimateRequest {
    #[validate(nested)]
    pub cost_estimate: CostEstimate,
    /// Overrides the configured rate for this document.
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeEstimateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_estimate_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(flatten)]
    pub summary: EstimateSummary,
    pub formatted: FormattedFigures,
}

/// Display strings, rounded to cents.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedFigures {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: String,
    pub tax_rate: String,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub sites: Vec<FormattedSite>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSite {
    pub label: String,
    pub dimensions: Option<String>,
    pub lease_amount: String,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

impl FormattedFigures {
    fn from_summary(summary: &EstimateSummary) -> Self {
        Self {
            start_date: summary.start_date.map(format_date),
            end_date: summary.end_date.map(format_date),
            duration: summary.duration_label.clone(),
            tax_rate: format!("{}%", (summary.tax_rate * Decimal::ONE_HUNDRED).normalize()),
            subtotal: format_amount(summary.subtotal),
            tax: format_amount(summary.tax),
            total: format_amount(summary.total),
            sites: summary.sites.iter().map(FormattedSite::from_site).collect(),
        }
    }
}

impl FormattedSite {
    fn from_site(site: &SiteSummary) -> Self {
        Self {
            label: site.label.clone(),
            dimensions: site
                .items
                .iter()
                .filter(|item| item.is_rental())
                .find_map(|item| item.specs.as_ref())
                .map(|specs| specs.label()),
            lease_amount: format_amount(site.lease_amount),
            subtotal: format_amount(site.subtotal),
            tax: format_amount(site.tax),
            total: format_amount(site.total),
        }
    }
}

/// `POST /v1/cost-estimates/summary`
#[instrument(
    skip(state, payload),
    fields(service = "estimate-service", method = "SummarizeEstimate")
)]
pub async fn summarize_estimate(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeEstimateRequest>, JsonRejection>,
) -> Result<Json<SummarizeEstimateResponse>, AppError> {
    let timer = HTTP_REQUEST_DURATION
        .with_label_values(&[ROUTE])
        .start_timer();

    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected malformed cost estimate body");
        rejected(AppError::from(rejection))
    })?;

    let options = resolve_options(&state.pricing, &request).map_err(rejected)?;

    request.validate().map_err(|e| {
        warn!(error = %e, "Rejected cost estimate payload");
        rejected(AppError::from(e))
    })?;

    let SummarizeEstimateRequest { cost_estimate, .. } = request;
    let summary = summarize(&cost_estimate, &options);

    for warning in &summary.warnings {
        PRICING_FALLBACKS_TOTAL
            .with_label_values(&[warning.reason()])
            .inc();
    }

    if summary.warnings.contains(&PricingWarning::AmountOverflow) {
        return Err(rejected(AppError::UnprocessableEntity(anyhow::anyhow!(
            "line item amounts are too large to total"
        ))));
    }

    SITES_PER_ESTIMATE.observe(summary.sites.len() as f64);
    SUMMARIES_TOTAL.with_label_values(&["ok"]).inc();
    HTTP_REQUESTS_TOTAL.with_label_values(&[ROUTE, "200"]).inc();

    info!(
        cost_estimate_number = cost_estimate.cost_estimate_number.as_deref().unwrap_or(""),
        sites = summary.sites.len(),
        prorated = summary.prorated,
        warnings = summary.warnings.len(),
        "Cost estimate summarized"
    );

    timer.observe_duration();

    let formatted = FormattedFigures::from_summary(&summary);
    Ok(Json(SummarizeEstimateResponse {
        cost_estimate_number: cost_estimate.cost_estimate_number,
        title: cost_estimate.title,
        client_name: cost_estimate.client_name,
        summary,
        formatted,
    }))
}

/// Counts a rejected request and hands the error back.
fn rejected(err: AppError) -> AppError {
    let status: StatusCode = err.status_code();
    SUMMARIES_TOTAL.with_label_values(&["invalid"]).inc();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[ROUTE, status.as_str()])
        .inc();
    err
}

fn resolve_options(
    defaults: &PricingOptions,
    request: &SummarizeEstimateRequest,
) -> Result<PricingOptions, AppError> {
    match request.tax_rate {
        None => Ok(*defaults),
        Some(rate) if tax::is_valid_rate(rate) => Ok(PricingOptions {
            tax_rate: rate,
            ..*defaults
        }),
        Some(rate) => Err(AppError::BadRequest(anyhow::anyhow!(
            "taxRate must be between 0 and 1, got {}",
            rate
        ))),
    }
}
