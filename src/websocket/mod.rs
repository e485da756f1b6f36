//! WebSocket streaming endpoint

mod handler;
mod transport;

pub use handler::ws_handler;
pub use transport::{read_client_frames, split_socket, ClientFrames, WsFrameSink};
