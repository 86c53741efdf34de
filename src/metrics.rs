//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Upstream Metrics
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("farmix_upstream_requests_total", "Total number of Neynar API requests"),
        &["endpoint", "status"]
    ).expect("metric can be created");
    pub static ref UPSTREAM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "farmix_upstream_request_duration_seconds",
            "Neynar API request duration in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"]
    ).expect("metric can be created");
    pub static ref EDGES_FETCHED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("farmix_edges_fetched_total", "Total number of social graph edges fetched"),
        &["kind"]
    ).expect("metric can be created");

    // Analysis Metrics
    pub static ref ANALYSES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("farmix_analyses_total", "Total number of compatibility analyses"),
        &["outcome"]
    ).expect("metric can be created");
    pub static ref COMPATIBILITY_SCORE: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "farmix_compatibility_score",
            "Distribution of computed compatibility scores"
        ).buckets(vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]),
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("farmix_errors_total", "Total number of errors"),
        &["error_type", "endpoint"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(UPSTREAM_REQUESTS_TOTAL.clone()))
        .expect("UPSTREAM_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(UPSTREAM_REQUEST_DURATION_SECONDS.clone()))
        .expect("UPSTREAM_REQUEST_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(EDGES_FETCHED_TOTAL.clone()))
        .expect("EDGES_FETCHED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ANALYSES_TOTAL.clone()))
        .expect("ANALYSES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(COMPATIBILITY_SCORE.clone()))
        .expect("COMPATIBILITY_SCORE can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
