use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

use super::stats::ConnectionStats;
use super::types::{ConnectionHandle, ConnectionId, ConnectionState};

/// Upper bound on a single close handshake
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Manages all active streaming connections
pub struct ConnectionRegistry {
    /// connection_id -> ConnectionHandle
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    close_timeout: Duration,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::with_close_timeout(DEFAULT_CLOSE_TIMEOUT)
    }

    /// A client that stops reading can stall a close; it is abandoned after `close_timeout`
    pub fn with_close_timeout(close_timeout: Duration) -> Self {
        Self {
            connections: DashMap::new(),
            close_timeout,
        }
    }

    /// Register an open connection and return its freshly assigned id
    pub fn add(&self, handle: Arc<ConnectionHandle>) -> ConnectionId {
        loop {
            let id = ConnectionId::new();
            match self.connections.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(handle);
                    tracing::info!(connection_id = %id, "Connection registered");
                    return id;
                }
                // v4 collisions are not expected in practice; draw again
                Entry::Occupied(_) => continue,
            }
        }
    }

    /// Evict and close a connection.
    ///
    /// The entry is taken out of the map before the close is issued, so a
    /// closed handle is never reachable through the registry. Unknown ids
    /// and close failures are ignored.
    pub async fn remove(&self, connection_id: ConnectionId) {
        self.evict(connection_id).await;
    }

    async fn evict(&self, connection_id: ConnectionId) -> bool {
        let Some((_, handle)) = self.connections.remove(&connection_id) else {
            return false;
        };

        match tokio::time::timeout(self.close_timeout, handle.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to close connection cleanly"
                );
            }
            Err(_) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    timeout_ms = self.close_timeout.as_millis() as u64,
                    "Connection close timed out, abandoning transport"
                );
            }
        }

        tracing::info!(
            connection_id = %connection_id,
            connected_secs = (Utc::now() - handle.connected_at).num_seconds(),
            "Connection unregistered"
        );
        true
    }

    /// Point-in-time snapshot of all registered connections
    pub fn enumerate(&self) -> Vec<(ConnectionId, Arc<ConnectionHandle>)> {
        self.connections
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect()
    }

    /// Get connection by ID
    pub fn get(&self, connection_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(&connection_id).map(|h| h.clone())
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.connections.contains_key(&connection_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Get statistics
    pub fn stats(&self) -> ConnectionStats {
        let mut stats = ConnectionStats::default();
        for entry in self.connections.iter() {
            stats.total_connections += 1;
            match entry.value().state() {
                ConnectionState::Open => stats.open += 1,
                ConnectionState::Closing => stats.closing += 1,
                ConnectionState::Closed => {}
            }
        }
        stats
    }

    /// Remove and close every registered connection, returning how many were closed
    pub async fn close_all(&self) -> usize {
        let ids: Vec<ConnectionId> = self.connections.iter().map(|r| *r.key()).collect();
        let mut closed = 0;

        for id in ids {
            if self.evict(id).await {
                closed += 1;
            }
        }

        if closed > 0 {
            tracing::info!(closed = closed, "Closed all remaining connections");
        }
        closed
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
