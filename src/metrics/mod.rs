//! Prometheus metrics for the radar
//!
//! This module provides metrics tracking for:
//! - Load gate: partition cycles by outcome, bucket sizes
//! - Refresh: analysis runs by status, stored trends, per-area analysis time
//! - API: request counts and latency by endpoint
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter, register_counter_vec, register_gauge_vec, register_histogram_vec, Counter,
    CounterVec, Encoder, GaugeVec, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all radar metrics
struct RadarMetrics {
    partition_cycles: CounterVec,
    bucket_size: GaugeVec,
    refreshes: CounterVec,
    trends_stored: Counter,
    analysis_duration: HistogramVec,
    api_requests: CounterVec,
    api_duration: HistogramVec,
}

/// Global storage for radar metrics
static RADAR_METRICS: OnceLock<RadarMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = RadarMetrics {
        partition_cycles: register_counter_vec!(
            "trendradar_partition_cycles_total",
            "Load gate checks by outcome",
            &["outcome"]
        )?,
        bucket_size: register_gauge_vec!(
            "trendradar_bucket_size",
            "Number of trends in each bucket after the latest partition",
            &["bucket"]
        )?,
        refreshes: register_counter_vec!(
            "trendradar_refreshes_total",
            "Radar refresh runs by status",
            &["status"]
        )?,
        trends_stored: register_counter!(
            "trendradar_trends_stored_total",
            "Total trends written by refresh runs"
        )?,
        analysis_duration: register_histogram_vec!(
            "trendradar_analysis_duration_seconds",
            "Time spent analyzing one focus area",
            &["focus_area"],
            vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
        )?,
        api_requests: register_counter_vec!(
            "trendradar_api_requests_total",
            "Total API requests by endpoint and status",
            &["endpoint", "status"]
        )?,
        api_duration: register_histogram_vec!(
            "trendradar_api_request_duration_seconds",
            "API request duration in seconds",
            &["endpoint"],
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
        )?,
    };

    RADAR_METRICS
        .set(metrics)
        .map_err(|_| "radar metrics already registered")?;

    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    RADAR_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record one load gate check
pub fn record_partition_cycle(outcome: &str) {
    if let Some(m) = RADAR_METRICS.get() {
        m.partition_cycles.with_label_values(&[outcome]).inc();
    }
}

/// Record bucket sizes published by the load gate
pub fn record_bucket_sizes<'a>(counts: impl IntoIterator<Item = (&'a str, usize)>) {
    let Some(m) = RADAR_METRICS.get() else {
        return;
    };

    for (bucket, size) in counts {
        m.bucket_size.with_label_values(&[bucket]).set(size as f64);
    }
}

/// Record a refresh run
pub fn record_refresh(status: &str, stored: usize) {
    let Some(m) = RADAR_METRICS.get() else {
        return;
    };

    m.refreshes.with_label_values(&[status]).inc();
    if stored > 0 {
        m.trends_stored.inc_by(stored as f64);
    }
}

/// Record API request
pub fn record_api_request(endpoint: &str, status: u16, duration_secs: f64) {
    let Some(m) = RADAR_METRICS.get() else {
        return;
    };

    let status_str = status.to_string();
    m.api_requests
        .with_label_values(&[endpoint, &status_str])
        .inc();
    m.api_duration
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl MetricsTimer {
    fn new(timer: prometheus::HistogramTimer) -> Self {
        Self { timer: Some(timer) }
    }

    /// Create a no-op timer when metrics are not initialized
    fn noop() -> Self {
        Self { timer: None }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start a per-focus-area analysis timer
pub fn start_analysis_timer(focus_area: &str) -> MetricsTimer {
    match RADAR_METRICS.get() {
        Some(m) => MetricsTimer::new(
            m.analysis_duration
                .with_label_values(&[focus_area])
                .start_timer(),
        ),
        None => MetricsTimer::noop(),
    }
}

// ============================================================================
// Tests
// ============================================================================
