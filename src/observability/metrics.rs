//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_datagrams_received_total` (counter): datagrams read by the receiver
//! - `gateway_datagram_bytes_total` (counter): payload bytes read by the receiver
//! - `gateway_decode_failures_total` (counter): datagrams that did not decode
//! - `gateway_deliveries_total` (counter): decoded requests handed on, by `outcome`
//! - `gateway_datagrams_sent_total` (counter): sender attempts, by `outcome`
//!
//! # Design Decisions
//! - Recording functions are free functions so call sites stay one line
//! - Without [`init_metrics`] every call is a no-op

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_datagram_received(bytes: usize) {
    counter!("gateway_datagrams_received_total").increment(1);
    counter!("gateway_datagram_bytes_total").increment(bytes as u64);
}

pub fn record_decode_failure() {
    counter!("gateway_decode_failures_total").increment(1);
}

pub fn record_delivery(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("gateway_deliveries_total", "outcome" => outcome).increment(1);
}

/// Record one sender attempt, labelled `ok` or by failure kind.
pub fn record_send(outcome: &'static str) {
    counter!("gateway_datagrams_sent_total", "outcome" => outcome).increment(1);
}
