//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    STATION_ERRORS, STATION_OPERATIONS, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_CLOSED,
    WS_CONNECTIONS_OPENED, WS_FRAMES_SENT, WS_MESSAGES_RECEIVED, WS_SEND_FAILURES,
    WS_SESSION_DURATION, WS_SESSION_EXITS,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording streaming session metrics
pub struct SessionMetrics;

impl SessionMetrics {
    /// Record a session that has registered its connection
    pub fn record_opened() {
        WS_CONNECTIONS_OPENED.inc();
        WS_CONNECTIONS_ACTIVE.inc();
    }

    /// Record a telemetry frame written to a client
    pub fn record_frame_sent() {
        WS_FRAMES_SENT.inc();
    }

    /// Record a failed frame write
    pub fn record_send_failure() {
        WS_SEND_FAILURES.inc();
    }

    /// Record a finished session with its exit reason and lifetime
    pub fn record_exit(reason: &str, duration_secs: f64) {
        WS_CONNECTIONS_CLOSED.inc();
        WS_CONNECTIONS_ACTIVE.dec();
        WS_SESSION_EXITS.with_label_values(&[reason]).inc();
        WS_SESSION_DURATION.observe(duration_secs);
    }

    /// Record a frame received from a client
    pub fn record_received(kind: &str) {
        WS_MESSAGES_RECEIVED.with_label_values(&[kind]).inc();
    }
}

/// Helper struct for recording station store metrics
pub struct StationMetrics;

impl StationMetrics {
    pub fn record_operation(op: &str) {
        STATION_OPERATIONS.with_label_values(&[op]).inc();
    }

    pub fn record_error(op: &str) {
        STATION_ERRORS.with_label_values(&[op]).inc();
    }
}
