use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crate::connection_manager::ConnectionHandle;
use crate::server::AppState;
use crate::session::{DelayPolicy, StreamingSession};

use super::transport::{read_client_frames, split_socket};

/// WebSocket upgrade handler
///
/// Anything that is not a valid upgrade request gets `400 Bad Request`.
#[tracing::instrument(name = "ws.upgrade", skip(ws, state))]
pub async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::warn!(reason = %rejection, "Rejected non-upgrade request on streaming endpoint");
            return (StatusCode::BAD_REQUEST, "Expected a WebSocket upgrade request").into_response();
        }
    };

    tracing::debug!("WebSocket upgrade requested");

    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection
#[tracing::instrument(
    name = "ws.connection",
    skip(socket, state),
    fields(otel.kind = "server")
)]
async fn handle_socket(socket: WebSocket, state: AppState) {
    let streaming = &state.settings.streaming;

    // Split socket into sender and receiver
    let (ws_sender, ws_receiver) = split_socket(socket);
    let handle = Arc::new(ConnectionHandle::new(ws_sender));

    let session = StreamingSession::start(
        state.registry.clone(),
        handle.clone(),
        DelayPolicy::from_config(streaming),
        state.shutdown.child_token(),
    );
    let connection_id = session.connection_id();

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    // Task for observing the client side of the connection
    let recv_task = tokio::spawn(read_client_frames(
        ws_receiver,
        handle,
        streaming.echo_enabled,
    ));

    let outcome = session.run().await;

    // The transport is closed by now; stop waiting on the peer
    recv_task.abort();

    tracing::info!(
        connection_id = %connection_id,
        frames_sent = outcome.frames_sent,
        exit = %outcome.exit,
        "WebSocket connection closed"
    );
}
