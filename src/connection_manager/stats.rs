//! Connection statistics

use serde::Serialize;

/// Registry statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectionStats {
    pub total_connections: usize,
    pub open: usize,
    pub closing: usize,
}
