//! Connection registry for streaming clients
//!
//! This module provides:
//! - Connection handles wrapping the write half of a client transport
//! - A concurrent registry keyed by process-unique connection ids
//! - Connection statistics

mod registry;
mod stats;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use registry::{ConnectionRegistry, DEFAULT_CLOSE_TIMEOUT};
pub use stats::ConnectionStats;
pub use types::{ConnectionHandle, ConnectionId, ConnectionState, FrameSink, TransportError};
