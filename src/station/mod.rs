//! Station registry persistence
//!
//! Stations are plain records kept in PostgreSQL (or in memory for tests
//! and local runs). The streaming core does not depend on this module.

mod backend;
mod factory;
mod memory_backend;
mod models;
mod postgres_backend;

pub use backend::{StationStore, StoreError};
pub use factory::create_station_store;
pub use memory_backend::MemoryStationStore;
pub use models::{NewStation, Station, StationPayload, DEFAULT_STATUS};
pub use postgres_backend::PostgresStationStore;
