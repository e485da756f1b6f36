use axum::{routing::get, Router};

use crate::server::AppState;

use super::health::{health, stats};
use super::metrics::prometheus_metrics;
use super::station::{create_station, delete_station, get_station, list_stations, update_station};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Stats
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        // Station registry
        .route("/api/station", get(list_stations).post(create_station))
        .route(
            "/api/station/{id}",
            get(get_station).put(update_station).delete(delete_station),
        )
}
