//! Per-connection push loop and its lifecycle

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

use crate::connection_manager::{
    ConnectionHandle, ConnectionId, ConnectionRegistry, TransportError,
};
use crate::metrics::SessionMetrics;

use super::delay::DelayPolicy;
use super::sample::TelemetrySample;

/// Lifecycle phase of a streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Upgrading,
    Streaming,
    Terminating,
    Closed,
}

/// Why the push loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// The transport left the `Open` state (peer close or read failure)
    TransportClosed,
    /// Writing a frame failed
    SendFailed,
    /// A sample could not be serialized
    Serialization,
    /// The session's cancellation token fired
    Cancelled,
}

impl SessionExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransportClosed => "transport_closed",
            Self::SendFailed => "send_failed",
            Self::Serialization => "serialization",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary returned once a session has fully terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub connection_id: ConnectionId,
    pub frames_sent: u64,
    pub exit: SessionExit,
}

/// Drives one connection's post-upgrade lifetime
pub struct StreamingSession {
    id: ConnectionId,
    handle: Arc<ConnectionHandle>,
    registry: Arc<ConnectionRegistry>,
    delay: DelayPolicy,
    cancel: CancellationToken,
    rng: StdRng,
    phase: SessionPhase,
    frames_sent: u64,
    started_at: Instant,
}

impl StreamingSession {
    /// Register `handle` and enter the `Streaming` phase.
    ///
    /// Registration happens here, before any frame can be written, so a
    /// session is always tracked by the registry while it streams.
    pub fn start(
        registry: Arc<ConnectionRegistry>,
        handle: Arc<ConnectionHandle>,
        delay: DelayPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self::start_with_rng(registry, handle, delay, cancel, StdRng::from_os_rng())
    }

    /// Like [`StreamingSession::start`] with a caller-supplied generator
    pub fn start_with_rng(
        registry: Arc<ConnectionRegistry>,
        handle: Arc<ConnectionHandle>,
        delay: DelayPolicy,
        cancel: CancellationToken,
        rng: StdRng,
    ) -> Self {
        let mut phase = SessionPhase::Upgrading;
        let id = registry.add(handle.clone());
        SessionMetrics::record_opened();

        tracing::debug!(connection_id = %id, from = ?phase, to = ?SessionPhase::Streaming, "Session phase change");
        phase = SessionPhase::Streaming;

        Self {
            id,
            handle,
            registry,
            delay,
            cancel,
            rng,
            phase,
            frames_sent: 0,
            started_at: Instant::now(),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Stream until the connection closes, a write fails or the session is
    /// cancelled, then deregister.
    #[tracing::instrument(
        name = "ws.session",
        skip(self),
        fields(connection_id = %self.id)
    )]
    pub async fn run(mut self) -> SessionOutcome {
        let exit = self.stream().await;
        self.terminate(exit).await
    }

    async fn stream(&mut self) -> SessionExit {
        loop {
            if self.cancel.is_cancelled() {
                return SessionExit::Cancelled;
            }
            if !self.handle.is_open() {
                return SessionExit::TransportClosed;
            }

            let frame = match TelemetrySample::generate(&mut self.rng).to_json() {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize telemetry sample");
                    return SessionExit::Serialization;
                }
            };

            // A client that stopped reading must not hold the session past cancel or close
            let sent = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return SessionExit::Cancelled,
                _ = self.handle.closed() => return SessionExit::TransportClosed,
                sent = self.handle.send_text(frame) => sent,
            };
            match sent {
                Ok(()) => {}
                // Peer went away between the state check and the write
                Err(TransportError::NotOpen(_)) => return SessionExit::TransportClosed,
                Err(e) => {
                    SessionMetrics::record_send_failure();
                    tracing::debug!(error = %e, "Telemetry frame write failed");
                    return SessionExit::SendFailed;
                }
            }
            self.frames_sent += 1;
            SessionMetrics::record_frame_sent();

            let delay = self.delay.sample(&mut self.rng);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return SessionExit::Cancelled,
                _ = self.handle.closed() => return SessionExit::TransportClosed,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn terminate(mut self, exit: SessionExit) -> SessionOutcome {
        self.transition(SessionPhase::Terminating);
        self.registry.remove(self.id).await;
        self.transition(SessionPhase::Closed);

        let duration = self.started_at.elapsed().as_secs_f64();
        SessionMetrics::record_exit(exit.as_str(), duration);

        tracing::info!(
            connection_id = %self.id,
            frames_sent = self.frames_sent,
            exit = %exit,
            duration_secs = duration,
            "Streaming session ended"
        );

        SessionOutcome {
            connection_id: self.id,
            frames_sent: self.frames_sent,
            exit,
        }
    }

    fn transition(&mut self, next: SessionPhase) {
        tracing::debug!(connection_id = %self.id, from = ?self.phase, to = ?next, "Session phase change");
        self.phase = next;
    }
}
