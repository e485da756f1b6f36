//! PostgreSQL persistence module.
//!
//! Provides connection pooling for the station store.

pub mod pool;

pub use pool::{PostgresPool, PostgresPoolError};
