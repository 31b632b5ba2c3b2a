//! Metrics collection and exposition.
//!
//! # Metrics
//! - `contact_submissions_total` (counter): submissions by outcome
//! - `contact_rate_limited_total` (counter): requests refused by the limiter
//! - `contact_mail_sent_total` (counter): sends by message kind and result
//! - `contact_dispatch_duration_seconds` (histogram): time to send both messages
//!
//! Recording is a no-op until [`init_metrics`] installs an exporter.

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter"),
    }
}

pub fn record_submission(outcome: &'static str) {
    counter!("contact_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limited() {
    counter!("contact_rate_limited_total").increment(1);
}

pub fn record_mail_sent(kind: &'static str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    counter!("contact_mail_sent_total", "kind" => kind, "result" => result).increment(1);
}

pub fn record_dispatch_duration(start: Instant) {
    histogram!("contact_dispatch_duration_seconds").record(start.elapsed().as_secs_f64());
}
