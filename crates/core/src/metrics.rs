//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog requests (counts, latency, quota spent, quota short-circuits)
//! - Pipeline (deduplicated, filtered and reported items, keyword outcomes)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Catalog requests total by kind and status.
pub static CATALOG_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidscout_catalog_requests_total", "Total catalog API requests"),
        &["kind", "status"], // kind: "search", "details", "owners"; status: "success", "error"
    )
    .unwrap()
});

/// Catalog request duration.
pub static CATALOG_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidscout_catalog_request_duration_seconds",
            "Duration of catalog API calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["kind"],
    )
    .unwrap()
});

/// Quota units charged by request kind.
pub static QUOTA_UNITS_CHARGED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "vidscout_quota_units_charged_total",
            "Quota units charged against the daily cap",
        ),
        &["kind"],
    )
    .unwrap()
});

/// Calls skipped because the quota could not cover them.
pub static QUOTA_SHORT_CIRCUITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "vidscout_quota_short_circuits_total",
            "Catalog calls skipped because the quota cap would be exceeded",
        ),
        &["kind"],
    )
    .unwrap()
});

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Search hits dropped because they were already reported.
pub static ITEMS_DEDUPLICATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "vidscout_items_deduplicated_total",
        "Search hits skipped because they were already reported",
    )
    .unwrap()
});

/// Enriched items rejected by the filter.
pub static ITEMS_FILTERED_OUT: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "vidscout_items_filtered_out_total",
        "Enriched items rejected by the filter criteria",
    )
    .unwrap()
});

/// Items reported and recorded in the seen ledger.
pub static ITEMS_REPORTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("vidscout_items_reported_total", "Total items reported").unwrap()
});

/// Keyword outcomes by status.
pub static KEYWORD_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidscout_keyword_outcomes_total", "Keyword processing outcomes"),
        &["status"], // "completed", "no_results", "failed", "skipped"
    )
    .unwrap()
});

/// Run duration in seconds.
pub static RUN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("vidscout_run_duration_seconds", "Duration of a full run")
            .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Catalog
        Box::new(CATALOG_REQUESTS.clone()),
        Box::new(CATALOG_REQUEST_DURATION.clone()),
        Box::new(QUOTA_UNITS_CHARGED.clone()),
        Box::new(QUOTA_SHORT_CIRCUITS.clone()),
        // Pipeline
        Box::new(ITEMS_DEDUPLICATED.clone()),
        Box::new(ITEMS_FILTERED_OUT.clone()),
        Box::new(ITEMS_REPORTED.clone()),
        Box::new(KEYWORD_OUTCOMES.clone()),
        Box::new(RUN_DURATION.clone()),
    ]
}
