//! In-memory sink used by unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;

use super::{FrameSink, TransportError};

#[derive(Default)]
pub struct SinkLog {
    frames: Mutex<Vec<(Instant, String)>>,
    fail_sends: AtomicBool,
    close_calls: AtomicUsize,
}

impl SinkLog {
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().unwrap().iter().map(|(_, f)| f.clone()).collect()
    }

    pub fn timestamps(&self) -> Vec<Instant> {
        self.frames.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

pub struct RecordingSink {
    log: Arc<SinkLog>,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<SinkLog>) {
        let log = Arc::new(SinkLog::default());
        (Self { log: log.clone() }, log)
    }
}

#[async_trait]
impl FrameSink for RecordingSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        if self.log.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected);
        }
        self.log.frames.lock().unwrap().push((Instant::now(), text));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let calls = self.log.close_calls.fetch_add(1, Ordering::SeqCst);
        if calls > 0 {
            return Err(TransportError::Disconnected);
        }
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
