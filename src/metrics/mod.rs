//! Prometheus metrics for the station telemetry service.
//!
//! This module provides metrics for monitoring the service:
//! - Connection metrics (active, opened, closed)
//! - Streaming metrics (frames sent, send failures, session exits and duration)
//! - Client frames received on the read path
//! - Station store operations

mod helpers;

pub use helpers::{encode_metrics, SessionMetrics, StationMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "station";

lazy_static! {
    // ============================================================================
    // Connection Metrics
    // ============================================================================

    /// Number of connections currently in the registry
    pub static ref WS_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_ws_connections_active", METRIC_PREFIX),
        "Number of registered streaming connections"
    ).unwrap();

    /// WebSocket connections opened
    pub static ref WS_CONNECTIONS_OPENED: IntCounter = register_int_counter!(
        format!("{}_ws_connections_opened_total", METRIC_PREFIX),
        "Total WebSocket connections opened"
    ).unwrap();

    /// WebSocket connections closed
    pub static ref WS_CONNECTIONS_CLOSED: IntCounter = register_int_counter!(
        format!("{}_ws_connections_closed_total", METRIC_PREFIX),
        "Total WebSocket connections closed"
    ).unwrap();

    // ============================================================================
    // Streaming Metrics
    // ============================================================================

    /// Telemetry frames written to clients
    pub static ref WS_FRAMES_SENT: IntCounter = register_int_counter!(
        format!("{}_ws_frames_sent_total", METRIC_PREFIX),
        "Total telemetry frames sent to clients"
    ).unwrap();

    /// Failed frame writes
    pub static ref WS_SEND_FAILURES: IntCounter = register_int_counter!(
        format!("{}_ws_send_failures_total", METRIC_PREFIX),
        "Total failed telemetry frame writes"
    ).unwrap();

    /// Session exits by reason
    pub static ref WS_SESSION_EXITS: IntCounterVec = register_int_counter_vec!(
        format!("{}_ws_session_exits_total", METRIC_PREFIX),
        "Total streaming sessions ended, by exit reason",
        &["reason"]
    ).unwrap();

    /// Streaming session duration
    pub static ref WS_SESSION_DURATION: Histogram = register_histogram!(
        format!("{}_ws_session_duration_seconds", METRIC_PREFIX),
        "Streaming session duration in seconds",
        vec![1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 600.0, 1800.0, 3600.0]
    ).unwrap();

    /// Frames received from clients on the read path
    pub static ref WS_MESSAGES_RECEIVED: IntCounterVec = register_int_counter_vec!(
        format!("{}_ws_messages_received_total", METRIC_PREFIX),
        "Total WebSocket frames received from clients",
        &["type"]
    ).unwrap();

    // ============================================================================
    // Station Store Metrics
    // ============================================================================

    /// Station store operations by kind
    pub static ref STATION_OPERATIONS: IntCounterVec = register_int_counter_vec!(
        format!("{}_station_operations_total", METRIC_PREFIX),
        "Total station store operations",
        &["op"]
    ).unwrap();

    /// Station store failures by kind
    pub static ref STATION_ERRORS: IntCounterVec = register_int_counter_vec!(
        format!("{}_station_errors_total", METRIC_PREFIX),
        "Total failed station store operations",
        &["op"]
    ).unwrap();
}
