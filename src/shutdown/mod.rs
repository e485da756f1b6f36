//! Graceful shutdown handling for the telemetry service.
//!
//! Shutdown runs in three phases:
//! 1. Cancel the root token so every streaming session stops at its next
//!    cancellation point
//! 2. Wait for sessions to deregister on their own, bounded by a drain timeout
//! 3. Remove and close whatever is still registered

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::config::StreamingConfig;
use crate::connection_manager::ConnectionRegistry;

/// Configuration for graceful shutdown behavior
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Time to wait for sessions to deregister (default: 5 seconds)
    pub drain_timeout: Duration,
    /// How often the registry is polled while draining
    pub poll_interval: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl ShutdownConfig {
    pub fn from_streaming(config: &StreamingConfig) -> Self {
        Self {
            drain_timeout: Duration::from_secs(config.shutdown_timeout_seconds),
            ..Self::default()
        }
    }
}

/// Handles graceful shutdown of the telemetry service
pub struct GracefulShutdown {
    registry: Arc<ConnectionRegistry>,
    token: CancellationToken,
    config: ShutdownConfig,
}

impl GracefulShutdown {
    pub fn new(registry: Arc<ConnectionRegistry>, token: CancellationToken) -> Self {
        Self::with_config(registry, token, ShutdownConfig::default())
    }

    pub fn with_config(
        registry: Arc<ConnectionRegistry>,
        token: CancellationToken,
        config: ShutdownConfig,
    ) -> Self {
        Self {
            registry,
            token,
            config,
        }
    }

    /// Execute graceful shutdown sequence
    #[tracing::instrument(
        name = "graceful_shutdown",
        skip(self),
        fields(total_connections = self.registry.len())
    )]
    pub async fn execute(&self, reason: &str) -> ShutdownResult {
        let start = Instant::now();
        let mut result = ShutdownResult {
            initial_connections: self.registry.len(),
            ..ShutdownResult::default()
        };

        tracing::info!(reason = %reason, "Starting graceful shutdown - Phase 1: Cancelling sessions");
        self.token.cancel();

        tracing::info!("Phase 2: Waiting for sessions to deregister");
        result.drained = self.wait_for_drain().await;

        tracing::info!("Phase 3: Closing remaining connections");
        result.force_closed = self.registry.close_all().await;

        result.duration = start.elapsed();

        tracing::info!(
            initial_connections = result.initial_connections,
            drained = result.drained,
            force_closed = result.force_closed,
            duration_ms = result.duration.as_millis(),
            "Graceful shutdown completed"
        );

        result
    }

    /// Poll until the registry is empty or the drain timeout passes
    async fn wait_for_drain(&self) -> bool {
        if self.registry.is_empty() {
            return true;
        }

        let registry = self.registry.clone();
        let interval = self.config.poll_interval;
        let drain = async move {
            while !registry.is_empty() {
                tokio::time::sleep(interval).await;
            }
        };

        match timeout(self.config.drain_timeout, drain).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    remaining_connections = self.registry.len(),
                    "Drain timeout, closing remaining connections"
                );
                false
            }
        }
    }
}

/// Result of a graceful shutdown operation
#[derive(Debug, Default)]
pub struct ShutdownResult {
    /// Connections registered when shutdown began
    pub initial_connections: usize,
    /// Whether every session deregistered before the timeout
    pub drained: bool,
    /// Connections that had to be removed and closed after the drain phase
    pub force_closed: usize,
    /// Total time taken for shutdown
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection_manager::testing::{RecordingSink, StalledSink};
    use crate::connection_manager::ConnectionHandle;
    use crate::connection_manager::ConnectionState;
    use crate::session::{DelayPolicy, SessionExit, StreamingSession};

    #[tokio::test]
    async fn test_shutdown_no_connections() {
        let registry = Arc::new(ConnectionRegistry::new());
        let token = CancellationToken::new();
        let shutdown = GracefulShutdown::new(registry, token.clone());

        let result = shutdown.execute("test shutdown").await;

        assert!(token.is_cancelled());
        assert!(result.drained);
        assert_eq!(result.initial_connections, 0);
        assert_eq!(result.force_closed, 0);
    }

    #[tokio::test]
    async fn test_shutdown_drains_running_sessions() {
        let registry = Arc::new(ConnectionRegistry::new());
        let token = CancellationToken::new();

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let (sink, _log) = RecordingSink::new();
            let session = StreamingSession::start(
                registry.clone(),
                Arc::new(ConnectionHandle::new(sink)),
                DelayPolicy::new(5, 20),
                token.child_token(),
            );
            tasks.push(tokio::spawn(session.run()));
        }
        assert_eq!(registry.len(), 10);

        let shutdown = GracefulShutdown::new(registry.clone(), token);
        let result = shutdown.execute("test shutdown").await;

        assert_eq!(result.initial_connections, 10);
        assert!(result.drained);
        assert_eq!(result.force_closed, 0);
        assert!(registry.is_empty());

        for task in tasks {
            let outcome = task.await.unwrap();
            assert_eq!(outcome.exit, SessionExit::Cancelled);
        }
    }

    #[tokio::test]
    async fn test_shutdown_force_closes_stragglers() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (sink, log) = RecordingSink::new();
        // Registered directly, so nothing observes the token
        registry.add(Arc::new(ConnectionHandle::new(sink)));

        let config = ShutdownConfig {
            drain_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(10),
        };
        let shutdown = GracefulShutdown::with_config(registry.clone(), CancellationToken::new(), config);
        let result = shutdown.execute("test shutdown").await;

        assert!(!result.drained);
        assert_eq!(result.force_closed, 1);
        assert!(registry.is_empty());
        assert_eq!(log.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_completes_with_stalled_client() {
        let registry = Arc::new(ConnectionRegistry::with_close_timeout(Duration::from_millis(50)));
        let token = CancellationToken::new();

        let handle = Arc::new(ConnectionHandle::new(StalledSink));
        let session = StreamingSession::start(
            registry.clone(),
            handle.clone(),
            DelayPolicy::new(5, 20),
            token.child_token(),
        );
        let task = tokio::spawn(session.run());
        tokio::time::sleep(Duration::from_millis(20)).await;

        let config = ShutdownConfig {
            drain_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(10),
        };
        let shutdown = GracefulShutdown::with_config(registry.clone(), token, config);
        let result = tokio::time::timeout(Duration::from_secs(3), shutdown.execute("test shutdown"))
            .await
            .expect("shutdown must not hang on a client that stopped reading");

        assert_eq!(result.initial_connections, 1);
        assert!(registry.is_empty());
        assert_eq!(handle.state(), ConnectionState::Closed);

        let outcome = task.await.unwrap();
        assert_eq!(outcome.exit, SessionExit::Cancelled);
    }

    #[tokio::test]
    async fn test_force_close_of_stalled_straggler_is_bounded() {
        let registry = Arc::new(ConnectionRegistry::with_close_timeout(Duration::from_millis(50)));
        let handle = Arc::new(ConnectionHandle::new(StalledSink));
        // Holds the sink lock forever and ignores the token
        let writer = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.send_text("stuck".to_string()).await })
        };
        tokio::task::yield_now().await;
        registry.add(handle.clone());

        let config = ShutdownConfig {
            drain_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(10),
        };
        let shutdown = GracefulShutdown::with_config(registry.clone(), CancellationToken::new(), config);
        let result = tokio::time::timeout(Duration::from_secs(3), shutdown.execute("test shutdown"))
            .await
            .expect("force close must be bounded");

        assert!(!result.drained);
        assert_eq!(result.force_closed, 1);
        assert!(registry.is_empty());
        assert_eq!(handle.state(), ConnectionState::Closed);
        writer.abort();
    }

    #[test]
    fn test_config_from_streaming() {
        let streaming = StreamingConfig {
            shutdown_timeout_seconds: 12,
            ..StreamingConfig::default()
        };
        let config = ShutdownConfig::from_streaming(&streaming);
        assert_eq!(config.drain_timeout, Duration::from_secs(12));
        assert_eq!(config.poll_interval, Duration::from_millis(50));
    }
}
