//! In-memory station store backend.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::backend::{StationStore, StoreError};
use super::models::{NewStation, Station};

/// Station store kept in process memory.
///
/// Data is lost on restart; used for tests and local development.
pub struct MemoryStationStore {
    stations: DashMap<i32, Station>,
    next_id: AtomicI32,
}

impl MemoryStationStore {
    pub fn new() -> Self {
        Self {
            stations: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for MemoryStationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StationStore for MemoryStationStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<Station>, StoreError> {
        let mut stations: Vec<Station> = self.stations.iter().map(|r| r.value().clone()).collect();
        stations.sort_by_key(|s| s.id);
        Ok(stations)
    }

    async fn get(&self, id: i32) -> Result<Option<Station>, StoreError> {
        Ok(self.stations.get(&id).map(|r| r.value().clone()))
    }

    async fn create(&self, station: NewStation) -> Result<Station, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let station = station.into_station(id);
        self.stations.insert(id, station.clone());
        Ok(station)
    }

    async fn update(&self, id: i32, station: NewStation) -> Result<Station, StoreError> {
        match self.stations.get_mut(&id) {
            Some(mut entry) => {
                let updated = station.into_station(id);
                *entry = updated.clone();
                Ok(updated)
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        self.stations
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
