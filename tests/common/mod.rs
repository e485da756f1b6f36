//! Shared helpers for integration tests

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing_subscriber::fmt::MakeWriter;

use station_telemetry_service::config::Settings;
use station_telemetry_service::connection_manager::{FrameSink, TransportError};
use station_telemetry_service::server::AppState;
use station_telemetry_service::station::MemoryStationStore;

/// Observable state of a [`MockSink`]
#[derive(Default)]
pub struct SinkState {
    frames: Mutex<Vec<String>>,
    broken: AtomicBool,
    closes: AtomicUsize,
}

impl SinkState {
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().unwrap().clone()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    /// Make every later write fail
    pub fn break_transport(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// In-memory frame sink
pub struct MockSink {
    state: Arc<SinkState>,
}

pub fn mock_sink() -> (MockSink, Arc<SinkState>) {
    let state = Arc::new(SinkState::default());
    (
        MockSink {
            state: state.clone(),
        },
        state,
    )
}

#[async_trait]
impl FrameSink for MockSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        if self.state.broken.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected);
        }
        self.state.frames.lock().unwrap().push(text);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink for a client that stopped reading: writes and closes never complete
pub struct StalledSink;

#[async_trait]
impl FrameSink for StalledSink {
    async fn send_text(&mut self, _text: String) -> Result<(), TransportError> {
        std::future::pending().await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        std::future::pending().await
    }
}

/// Settings for tests: memory station store and short frame delays
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.stations.backend = "memory".to_string();
    settings.streaming.min_delay_ms = 5;
    settings.streaming.max_delay_ms = 20;
    settings.streaming.shutdown_timeout_seconds = 2;
    settings.streaming.close_timeout_ms = 200;
    settings
}

pub fn test_state() -> AppState {
    AppState::new(test_settings(), Arc::new(MemoryStationStore::new()))
}

/// Collects formatted log lines written by a test subscriber
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    /// Install a WARN-level subscriber for the current thread
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
