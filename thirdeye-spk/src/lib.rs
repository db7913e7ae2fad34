//! thirdeye-spk: the announcement half of the thirdeye aid
//!
//! Consumes stable detection events from the durable queue one at a time,
//! attaches a distance reading, and speaks the result. Playback finishing is
//! the backpressure point: further events simply wait on the broker.

pub mod announcer;
pub mod config;
pub mod distance;
pub mod engines;
pub mod error;
pub mod playback;

pub use announcer::{format_announcement, Announcer, HandleOutcome};
pub use config::SpeechConfig;
pub use distance::{DistanceEstimator, SimulatedRangeSensor};
pub use engines::TtsEngine;
pub use error::SpeechError;
pub use playback::AudioPlayer;
