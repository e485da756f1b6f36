//! Connection handle and related types

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

/// Process-unique identifier assigned by the registry at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a connection's transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Open,
    Closing,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

/// Errors raised by the write half of a connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection is not open (state: {0})")]
    NotOpen(&'static str),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] axum::Error),

    #[error("Transport disconnected")]
    Disconnected,
}

/// Write half of a duplex channel to one client.
#[async_trait]
pub trait FrameSink: Send {
    /// Write one complete text frame.
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Send a normal-closure frame and flush outstanding bytes.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Handle for a single streaming connection
pub struct ConnectionHandle {
    pub connected_at: DateTime<Utc>,
    state: watch::Sender<ConnectionState>,
    sink: Mutex<Box<dyn FrameSink>>,
}

impl ConnectionHandle {
    pub fn new(sink: impl FrameSink + 'static) -> Self {
        let (state, _) = watch::channel(ConnectionState::Open);
        Self {
            connected_at: Utc::now(),
            state,
            sink: Mutex::new(Box::new(sink)),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Move an open connection to `Closing`.
    ///
    /// Called when the read half observes the peer going away. Returns
    /// `true` if this call performed the transition.
    pub fn mark_closing(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Open {
                *state = ConnectionState::Closing;
                true
            } else {
                false
            }
        })
    }

    /// Resolves once the connection has left the `Open` state.
    pub async fn closed(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|state| *state != ConnectionState::Open).await;
    }

    /// Write a text frame. A failed write moves the connection to `Closing`.
    pub async fn send_text(&self, text: String) -> Result<(), TransportError> {
        let mut sink = self.sink.lock().await;

        let state = self.state();
        if state != ConnectionState::Open {
            return Err(TransportError::NotOpen(state.as_str()));
        }

        let result = sink.send_text(text).await;
        if result.is_err() {
            self.mark_closing();
        }
        result
    }

    /// Close the transport. Only the first call reaches the sink; later
    /// calls return `Ok(())`.
    pub async fn close(&self) -> Result<(), TransportError> {
        let first = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Closed {
                false
            } else {
                *state = ConnectionState::Closed;
                true
            }
        });

        if !first {
            return Ok(());
        }

        self.sink.lock().await.close().await
    }
}
