//! Per-connection telemetry streaming
//!
//! A [`StreamingSession`] registers its connection, pushes a freshly
//! generated [`TelemetrySample`] as one text frame per tick, sleeps for a
//! randomized [`DelayPolicy`] interval and deregisters itself on every exit
//! path.

mod delay;
mod sample;
mod stream;

pub use delay::DelayPolicy;
pub use sample::{TelemetrySample, TelemetryStatus};
pub use stream::{SessionExit, SessionOutcome, SessionPhase, StreamingSession};
