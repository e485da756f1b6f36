//! Backend trait for station storage.
//!
//! This module defines the abstraction layer for station persistence,
//! allowing different storage implementations (memory, PostgreSQL) to be
//! used interchangeably.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{NewStation, Station};

/// Errors that can occur during station store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No station with this id exists
    #[error("Station {0} not found")]
    NotFound(i32),

    /// Payload failed validation
    #[error("Invalid station: {0}")]
    Validation(String),

    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Trait for station storage backends.
#[async_trait]
pub trait StationStore: Send + Sync {
    /// Backend type identifier
    fn backend_name(&self) -> &'static str;

    /// All stations ordered by id
    async fn list(&self) -> Result<Vec<Station>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Station>, StoreError>;

    /// Insert a station and return it with its generated id
    async fn create(&self, station: NewStation) -> Result<Station, StoreError>;

    /// Replace all fields of an existing station.
    ///
    /// Returns `StoreError::NotFound` if the station no longer exists.
    async fn update(&self, id: i32, station: NewStation) -> Result<Station, StoreError>;

    /// Returns `StoreError::NotFound` if the station does not exist.
    async fn delete(&self, id: i32) -> Result<(), StoreError>;
}
