//! Prometheus metrics for the CampMinder integration.
//!
//! All metrics follow the naming convention: `cm_<area>_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // OUTBOUND: EstablishConnection
    // =========================================================================

    /// Total EstablishConnection round trips attempted
    pub static ref CONNECT_ATTEMPTS: Counter = Counter::new(
        "cm_connect_attempts_total",
        "Total number of EstablishConnection requests sent to CampMinder"
    ).expect("metric creation failed");

    /// EstablishConnection outcomes
    pub static ref CONNECT_OUTCOMES: CounterVec = CounterVec::new(
        Opts::new("cm_connect_outcomes_total", "EstablishConnection outcomes"),
        &["outcome"]  // success / failure / malformed / transport
    ).expect("metric creation failed");

    // =========================================================================
    // INBOUND: ClientLinkRequest
    // =========================================================================

    /// Link request outcomes
    pub static ref LINK_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("cm_link_requests_total", "ClientLinkRequest outcomes"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Rejected signed objects by failure kind
    pub static ref SIGNATURE_FAILURES: CounterVec = CounterVec::new(
        Opts::new("cm_signature_failures_total", "Rejected signed objects"),
        &["kind"]
    ).expect("metric creation failed");
}

/// Handle keeping the registry alive
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry. Safe to call more than once.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(CONNECT_ATTEMPTS.clone()),
        Box::new(CONNECT_OUTCOMES.clone()),
        Box::new(LINK_REQUESTS.clone()),
        Box::new(SIGNATURE_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
