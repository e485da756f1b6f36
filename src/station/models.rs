//! Station records and request payloads

use serde::{Deserialize, Serialize};

use super::backend::StoreError;

/// Status assigned when a payload does not provide one
pub const DEFAULT_STATUS: &str = "Active";

/// A persisted station record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Station {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub status: String,
}

/// Validated field values for a create or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStation {
    pub name: String,
    pub location: String,
    pub status: String,
}

impl NewStation {
    pub fn into_station(self, id: i32) -> Station {
        Station {
            id,
            name: self.name,
            location: self.location,
            status: self.status,
        }
    }
}

/// Request body accepted by the create and update endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationPayload {
    /// Only checked on update, where it must match the path id when present
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl StationPayload {
    /// Check required fields and fill in the default status
    pub fn validate(self) -> Result<NewStation, StoreError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("name is required".to_string()));
        }

        let location = self.location.trim();
        if location.is_empty() {
            return Err(StoreError::Validation("location is required".to_string()));
        }

        let status = match self.status {
            Some(status) if status.trim().is_empty() => {
                return Err(StoreError::Validation("status must not be empty".to_string()));
            }
            Some(status) => status.trim().to_string(),
            None => DEFAULT_STATUS.to_string(),
        };

        Ok(NewStation {
            name: name.to_string(),
            location: location.to_string(),
            status,
        })
    }
}
