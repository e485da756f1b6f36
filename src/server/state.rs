use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::connection_manager::ConnectionRegistry;
use crate::station::StationStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<ConnectionRegistry>,
    pub stations: Arc<dyn StationStore>,
    /// Root token; every streaming session runs on a child of it
    pub shutdown: CancellationToken,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, stations: Arc<dyn StationStore>) -> Self {
        let close_timeout = Duration::from_millis(settings.streaming.close_timeout_ms);
        Self {
            settings: Arc::new(settings),
            registry: Arc::new(ConnectionRegistry::with_close_timeout(close_timeout)),
            stations,
            shutdown: CancellationToken::new(),
            start_time: Instant::now(),
        }
    }
}
