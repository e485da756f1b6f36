//! Station CRUD endpoints.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{AppError, Result};
use crate::metrics::StationMetrics;
use crate::server::AppState;
use crate::station::{Station, StationPayload, StoreError};

/// Count a store call and map its error
fn track<T>(op: &str, result: std::result::Result<T, StoreError>) -> Result<T> {
    StationMetrics::record_operation(op);
    result.map_err(|e| reject(op, e))
}

fn reject(op: &str, err: impl Into<AppError>) -> AppError {
    StationMetrics::record_error(op);
    err.into()
}

/// GET /api/station - List all stations
#[tracing::instrument(name = "http.list_stations", skip(state))]
pub async fn list_stations(State(state): State<AppState>) -> Result<Json<Vec<Station>>> {
    let stations = track("list", state.stations.list().await)?;
    Ok(Json(stations))
}

/// GET /api/station/{id} - Get a single station
#[tracing::instrument(name = "http.get_station", skip(state))]
pub async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Station>> {
    track("get", state.stations.get(id).await)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Station {} not found", id)))
}

/// POST /api/station - Create a station
///
/// Any `id` in the body is ignored; the store assigns one.
#[tracing::instrument(name = "http.create_station", skip(state, payload))]
pub async fn create_station(
    State(state): State<AppState>,
    Json(payload): Json<StationPayload>,
) -> Result<Response> {
    let station = payload.validate().map_err(|e| reject("create", e))?;
    let created = track("create", state.stations.create(station).await)?;

    tracing::info!(station_id = created.id, "Station created");

    let location = format!("/api/station/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    )
        .into_response())
}

/// PUT /api/station/{id} - Replace a station
#[tracing::instrument(name = "http.update_station", skip(state, payload))]
pub async fn update_station(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<StationPayload>,
) -> Result<StatusCode> {
    if let Some(body_id) = payload.id {
        if body_id != id {
            return Err(reject(
                "update",
                AppError::Validation(format!(
                    "Body id {} does not match path id {}",
                    body_id, id
                )),
            ));
        }
    }

    let station = payload.validate().map_err(|e| reject("update", e))?;
    track("update", state.stations.update(id, station).await)?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/station/{id} - Delete a station
#[tracing::instrument(name = "http.delete_station", skip(state))]
pub async fn delete_station(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    track("delete", state.stations.delete(id).await)?;

    tracing::info!(station_id = id, "Station deleted");
    Ok(StatusCode::NO_CONTENT)
}
