//! Prometheus metrics for the analytics core
//!
//! This module provides metrics tracking for:
//! - View requests by outcome (cache hit, miss, degraded, invalid)
//! - View computation latency
//! - Cache and graph backend failures
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use std::sync::{Mutex, OnceLock};

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all analytics metrics
struct AnalyticsMetrics {
    view_requests: CounterVec,
    view_duration: HistogramVec,
    cache_errors: CounterVec,
    graph_errors: CounterVec,
}

/// Global storage for analytics metrics
static ANALYTICS_METRICS: OnceLock<AnalyticsMetrics> = OnceLock::new();

/// Serializes registration so concurrent callers never register twice
static INIT_LOCK: Mutex<()> = Mutex::new(());

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first successful call registers.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = conceptscope::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
///     // Application can continue without metrics
/// }
/// ```
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if ANALYTICS_METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = AnalyticsMetrics {
        view_requests: register_counter_vec!(
            "conceptscope_view_requests_total",
            "Total analytic view requests by view and outcome",
            &["view", "outcome"]
        )?,
        view_duration: register_histogram_vec!(
            "conceptscope_view_duration_seconds",
            "Time spent serving an analytic view in seconds",
            &["view"],
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
        )?,
        cache_errors: register_counter_vec!(
            "conceptscope_cache_errors_total",
            "Total cache failures by operation",
            &["operation"]
        )?,
        graph_errors: register_counter_vec!(
            "conceptscope_graph_errors_total",
            "Total graph facade failures by kind",
            &["kind"]
        )?,
    };

    if ANALYTICS_METRICS.set(metrics).is_ok() {
        tracing::info!("Prometheus metrics initialized successfully");
    }
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    ANALYTICS_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a served view request
pub fn record_view(view: &str, outcome: &str, duration_secs: f64) {
    let Some(m) = ANALYTICS_METRICS.get() else {
        return;
    };

    m.view_requests.with_label_values(&[view, outcome]).inc();
    m.view_duration
        .with_label_values(&[view])
        .observe(duration_secs);
}

/// Record a rejected view request
pub fn record_invalid_request(view: &str) {
    if let Some(m) = ANALYTICS_METRICS.get() {
        m.view_requests.with_label_values(&[view, "invalid"]).inc();
    }
}

/// Record a cache failure
pub fn record_cache_error(operation: &str) {
    if let Some(m) = ANALYTICS_METRICS.get() {
        m.cache_errors.with_label_values(&[operation]).inc();
    }
}

/// Record a graph facade failure
pub fn record_graph_error(kind: &str) {
    if let Some(m) = ANALYTICS_METRICS.get() {
        m.graph_errors.with_label_values(&[kind]).inc();
    }
}

// ============================================================================
// Tests
// ============================================================================
