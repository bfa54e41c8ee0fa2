//! Transport metrics.
//!
//! # Metrics
//! - `transport_connect_total` (counter): connect attempts by transport
//!   (`plain`, `tls`) and outcome (`success` or an error kind)
//! - `transport_connect_duration_seconds` (histogram): connect latency by
//!   transport
//! - `transport_registry_lazy_total` (counter): built-in transports
//!   registered on first lookup, by scheme

use std::time::Duration;

pub fn record_connect(transport: &'static str, outcome: &'static str, elapsed: Duration) {
    ::metrics::counter!(
        "transport_connect_total",
        "transport" => transport,
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!("transport_connect_duration_seconds", "transport" => transport)
        .record(elapsed.as_secs_f64());
}

pub fn record_lazy_registration(scheme: &str) {
    ::metrics::counter!("transport_registry_lazy_total", "scheme" => scheme.to_string())
        .increment(1);
}
