//! Prometheus metrics for client requests.
//!
//! Metrics live in a custom registry with the `kafkaesque_admin` prefix so
//! they do not collide with an application's default registry. Expose them
//! by merging [`gather_metrics`] into the application's own scrape output.
//!
//! Registration errors are logged and an unregistered metric is used
//! instead of panicking.

use std::time::Duration;

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Registry, opts};
use tracing::warn;

/// Custom Prometheus registry for client metrics.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    Registry::new_custom(Some("kafkaesque_admin".to_string()), None)
        .unwrap_or_else(|_| Registry::new())
});

/// Total number of requests by api and outcome.
pub static REQUEST_COUNT: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec_safe(
        &REGISTRY,
        "requests_total",
        "Total number of Kafka API requests sent",
        &["api", "status"],
    )
});

/// Round trip duration in seconds, negotiation and decoding included.
pub static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec_safe(
        &REGISTRY,
        "request_duration_seconds",
        "Request duration in seconds",
        &["api"],
        vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ],
    )
});

/// Broker errors attached to individual results, by api and error code.
pub static BROKER_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec_safe(
        &REGISTRY,
        "broker_errors_total",
        "Broker error codes returned in responses",
        &["api", "code"],
    )
});

fn register_int_counter_vec_safe(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> IntCounterVec {
    let counter =
        IntCounterVec::new(opts!(name, help), labels).expect("metric opts should be valid");
    match registry.register(Box::new(counter.clone())) {
        Ok(()) => counter,
        Err(e) => {
            warn!(name, error = %e, "Failed to register IntCounterVec metric, using unregistered fallback");
            counter
        }
    }
}

fn register_histogram_vec_safe(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
    buckets: Vec<f64>,
) -> HistogramVec {
    let histogram = HistogramVec::new(HistogramOpts::new(name, help).buckets(buckets), labels)
        .expect("metric opts should be valid");
    match registry.register(Box::new(histogram.clone())) {
        Ok(()) => histogram,
        Err(e) => {
            warn!(name, error = %e, "Failed to register HistogramVec metric, using unregistered fallback");
            histogram
        }
    }
}

/// Snapshot of every metric in the client registry.
pub fn gather_metrics() -> Vec<prometheus::proto::MetricFamily> {
    REGISTRY.gather()
}

/// Record one client request. `status` is `success`, `timeout` or `error`.
pub fn record_request(api: &str, status: &str, duration: Duration) {
    REQUEST_COUNT.with_label_values(&[api, status]).inc();
    REQUEST_DURATION
        .with_label_values(&[api])
        .observe(duration.as_secs_f64());
}

/// Record a broker error code carried in a response.
pub fn record_broker_error(api: &str, code: i16) {
    BROKER_ERRORS
        .with_label_values(&[api, &code.to_string()])
        .inc();
}
