//! Station store factory

use std::sync::Arc;

use crate::config::StationStoreConfig;
use crate::postgres::PostgresPool;

use super::backend::{StationStore, StoreError};
use super::memory_backend::MemoryStationStore;
use super::postgres_backend::PostgresStationStore;

/// Create a station store based on configuration.
///
/// Returns the appropriate backend implementation based on the `backend` setting:
/// - `"postgres"` (default): Returns a `PostgresStationStore` if a pool is provided,
///   after making sure the `stations` table exists
/// - `"memory"`: Returns a `MemoryStationStore`
///
/// # Example
///
/// ```rust,ignore
/// let store = create_station_store(&settings.stations, Some(pg_pool)).await?;
/// ```
pub async fn create_station_store(
    settings: &StationStoreConfig,
    postgres_pool: Option<&PostgresPool>,
) -> Result<Arc<dyn StationStore>, StoreError> {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(backend = "postgres", "Creating PostgreSQL station store");
                let store = PostgresStationStore::new(pool.pool().clone());
                store.ensure_schema().await?;
                Ok(Arc::new(store))
            } else {
                tracing::warn!(
                    "PostgreSQL backend requested but no pool provided, falling back to memory"
                );
                Ok(Arc::new(MemoryStationStore::new()))
            }
        }
        "memory" => {
            tracing::info!(backend = "memory", "Creating memory station store");
            Ok(Arc::new(MemoryStationStore::new()))
        }
        other => {
            tracing::warn!(backend = %other, "Unknown station backend, falling back to memory");
            Ok(Arc::new(MemoryStationStore::new()))
        }
    }
}
