//! Binds axum's WebSocket halves to the connection registry

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{close_code, CloseFrame, Message, Utf8Bytes, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};

use crate::connection_manager::{ConnectionHandle, FrameSink, TransportError};
use crate::metrics::SessionMetrics;

const CLOSE_REASON: &str = "Connection closed";

/// Split an upgraded socket into its write and read halves.
///
/// The halves share whether the peer has already started the close
/// handshake, so the write half does not answer it with a second Close.
pub fn split_socket(socket: WebSocket) -> (WsFrameSink, ClientFrames) {
    let (sender, receiver) = socket.split();
    let peer_closed = Arc::new(AtomicBool::new(false));
    (
        WsFrameSink {
            inner: sender,
            peer_closed: peer_closed.clone(),
        },
        ClientFrames {
            inner: receiver,
            peer_closed,
        },
    )
}

/// Write half of an upgraded WebSocket
pub struct WsFrameSink {
    inner: SplitSink<WebSocket, Message>,
    peer_closed: Arc<AtomicBool>,
}

#[async_trait]
impl FrameSink for WsFrameSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.inner.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.peer_closed.load(Ordering::Acquire) {
            // The close reply is queued by the protocol layer; only flush it out
            if let Err(e) = self.inner.close().await {
                tracing::debug!(error = %e, "Flush after peer close failed");
            }
            return Ok(());
        }

        let frame = CloseFrame {
            code: close_code::NORMAL,
            reason: Utf8Bytes::from_static(CLOSE_REASON),
        };
        let sent = self.inner.send(Message::Close(Some(frame))).await;
        // Flush and shut down the sink even if the close frame could not be written
        let closed = self.inner.close().await;
        sent?;
        closed?;
        Ok(())
    }
}

/// Read half of an upgraded WebSocket
pub struct ClientFrames {
    inner: SplitStream<WebSocket>,
    peer_closed: Arc<AtomicBool>,
}

impl ClientFrames {
    fn mark_peer_closed(&self) {
        self.peer_closed.store(true, Ordering::Release);
    }
}

/// Drain the read half.
///
/// Runs independently of the push loop: it only observes the peer, marks the
/// handle `Closing` when the peer goes away, and optionally echoes text
/// frames back.
pub async fn read_client_frames(mut frames: ClientFrames, handle: Arc<ConnectionHandle>, echo: bool) {
    loop {
        match frames.inner.next().await {
            Some(Ok(Message::Text(text))) => {
                SessionMetrics::record_received("text");
                tracing::debug!(len = text.len(), "Received text frame");
                if echo {
                    if let Err(e) = handle.send_text(format!("Echo: {}", text.as_str())).await {
                        tracing::debug!(error = %e, "Echo write failed");
                        break;
                    }
                }
            }
            Some(Ok(Message::Binary(_))) => {
                SessionMetrics::record_received("binary");
            }
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                // Axum answers pings itself
            }
            Some(Ok(Message::Close(frame))) => {
                SessionMetrics::record_received("close");
                tracing::debug!(frame = ?frame, "Received close frame");
                frames.mark_peer_closed();
                break;
            }
            // Stream ends once the close handshake has completed
            None => {
                frames.mark_peer_closed();
                break;
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    handle.mark_closing();
}
