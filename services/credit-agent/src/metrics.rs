use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use std::time::Duration;

lazy_static! {
    // HTTP metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "credit_agent_http_requests_total",
        "Total HTTP requests",
        &["method", "path", "status"]
    ).expect("metric can be created");

    pub static ref HTTP_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "credit_agent_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    ).expect("metric can be created");

    // Business metrics
    pub static ref CREDIT_QUOTES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "credit_quotes_total",
        "Credit quotes issued by decision",
        &["decision"]
    ).expect("metric can be created");

    pub static ref BNPL_QUOTES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "bnpl_quotes_total",
        "BNPL quotes issued by approval",
        &["approved"]
    ).expect("metric can be created");
}

pub fn observe_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[method, path])
        .observe(elapsed.as_secs_f64());
}

/// Generate metrics output in Prometheus text format
pub fn render() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
