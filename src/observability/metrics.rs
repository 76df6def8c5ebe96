//! Metrics collection and exposition.
//!
//! # Metrics
//! - `task_api_requests_total` (counter): requests by method, route, status
//! - `task_api_request_duration_seconds` (histogram): dispatch latency
//! - `task_api_store_writes_total` (counter): store mutations by operation, outcome
//! - `task_api_imported_records_total` (counter): CSV records by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, route: &str, status: u16, started: Instant) {
    ::metrics::counter!(
        "task_api_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "task_api_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}

/// Record one store mutation attempt.
pub fn record_store_write(operation: &'static str, success: bool) {
    ::metrics::counter!(
        "task_api_store_writes_total",
        "operation" => operation,
        "outcome" => outcome(success)
    )
    .increment(1);
}

/// Record the outcome of a CSV import replay.
pub fn record_import(created: usize, failed: usize) {
    ::metrics::counter!("task_api_imported_records_total", "outcome" => "created")
        .increment(created as u64);
    ::metrics::counter!("task_api_imported_records_total", "outcome" => "failed")
        .increment(failed as u64);
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}
