//! Prometheus metrics for edgelab.
//!
//! Tracks request volume per endpoint, simulated latency, authorization
//! decisions and conditional-request outcomes.
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram, register_histogram_vec, CounterVec, Encoder,
    Histogram, HistogramVec, TextEncoder,
};

lazy_static! {
    /// Total number of requests served
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "edgelab_requests_total",
        "Total number of requests served by the simulator",
        &["endpoint", "status"]
    )
    .unwrap();

    /// Request handling duration
    pub static ref REQUEST_DURATION_MS: HistogramVec = register_histogram_vec!(
        "edgelab_request_duration_ms",
        "Request handling duration in milliseconds, including simulated delay",
        &["endpoint"],
        vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0]
    )
    .unwrap();

    /// Simulated delay applied by /slow
    pub static ref SIMULATED_DELAY_MS: Histogram = register_histogram!(
        "edgelab_simulated_delay_ms",
        "Histogram of simulated delay in milliseconds",
        vec![0.0, 100.0, 250.0, 500.0, 1000.0, 1200.0, 2500.0, 5000.0]
    )
    .unwrap();

    /// Gated resource decisions
    pub static ref AUTHORIZATION_TOTAL: CounterVec = register_counter_vec!(
        "edgelab_authorization_total",
        "Authorization decisions for the gated resource",
        &["decision"]  // decision: granted|denied
    )
    .unwrap();

    /// Conditional request outcomes
    pub static ref CONDITIONAL_TOTAL: CounterVec = register_counter_vec!(
        "edgelab_conditional_total",
        "Conditional request evaluations",
        &["result"]  // result: hit (304) | miss (200)
    )
    .unwrap();
}

/// Collect and return all metrics in Prometheus text format
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", err);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

pub fn record_request(endpoint: &str, status: u16, duration_ms: f64) {
    REQUESTS_TOTAL
        .with_label_values(&[endpoint, &status.to_string()])
        .inc();
    REQUEST_DURATION_MS
        .with_label_values(&[endpoint])
        .observe(duration_ms);
}

pub fn record_simulated_delay(delay_ms: u64) {
    SIMULATED_DELAY_MS.observe(delay_ms as f64);
}

pub fn record_authorization(decision: &str) {
    AUTHORIZATION_TOTAL.with_label_values(&[decision]).inc();
}

pub fn record_conditional(not_modified: bool) {
    let result = if not_modified { "hit" } else { "miss" };
    CONDITIONAL_TOTAL.with_label_values(&[result]).inc();
}
