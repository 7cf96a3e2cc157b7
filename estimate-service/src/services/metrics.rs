//! Prometheus metrics for estimate-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram, register_histogram_vec, CounterVec, Histogram,
    HistogramVec, TextEncoder,
};

/// HTTP request counter by route and status.
pub static HTTP_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "estimate_http_requests_total",
        "Total number of HTTP requests",
        &["route", "status"]
    )
    .expect("Failed to register http_requests_total")
});

/// HTTP request duration histogram by route.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "estimate_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["route"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register http_request_duration")
});

/// Summaries produced, by outcome.
pub static SUMMARIES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "estimate_summaries_total",
        "Total number of cost estimate summaries by outcome",
        &["outcome"] // ok, invalid
    )
    .expect("Failed to register summaries_total")
});

/// Fallback paths taken by the pricing engine.
pub static PRICING_FALLBACKS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "estimate_pricing_fallbacks_total",
        "Total number of pricing fallbacks by reason",
        &["reason"]
    )
    .expect("Failed to register pricing_fallbacks_total")
});

/// Site groups per summarized estimate.
pub static SITES_PER_ESTIMATE: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "estimate_sites_per_estimate",
        "Number of site groups per cost estimate",
        vec![1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 50.0]
    )
    .expect("Failed to register sites_per_estimate")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&HTTP_REQUESTS_TOTAL);
    Lazy::force(&HTTP_REQUEST_DURATION);
    Lazy::force(&SUMMARIES_TOTAL);
    Lazy::force(&PRICING_FALLBACKS_TOTAL);
    Lazy::force(&SITES_PER_ESTIMATE);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
