//! thirdeye-eye: the perception half of the thirdeye aid
//!
//! Captures camera frames, classifies them with an object-detection model,
//! debounces the noisy per-frame results into stable events, and publishes
//! those onto the durable event channel for thirdeye-spk to announce.

pub mod config;
pub mod detector;
pub mod error;
pub mod pipeline;
pub mod stability;

#[cfg(feature = "vision-backend")]
pub mod camera;
#[cfg(feature = "vision-backend")]
pub mod models;

pub use config::VisionConfig;
pub use detector::{Detector, Frame};
pub use error::VisionError;
pub use pipeline::{DetectionPipeline, EventSink};
pub use stability::StabilityFilter;
