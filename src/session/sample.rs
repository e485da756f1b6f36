//! Synthetic telemetry payload pushed on every tick

use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

const ALL_USERS: Range<u32> = 50..100;
const ONLINE_USERS: Range<u32> = 20..50;
const OFFLINE_USERS: Range<u32> = 10..20;

/// Station status reported in a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelemetryStatus {
    Online,
    Offline,
}

/// One telemetry frame as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    pub all_users: u32,
    pub online_users: u32,
    pub offline_users: u32,
    pub status: TelemetryStatus,
}

impl TelemetrySample {
    /// Draw a fresh sample from `rng`
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            all_users: rng.random_range(ALL_USERS),
            online_users: rng.random_range(ONLINE_USERS),
            offline_users: rng.random_range(OFFLINE_USERS),
            status: if rng.random_bool(0.5) {
                TelemetryStatus::Online
            } else {
                TelemetryStatus::Offline
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
