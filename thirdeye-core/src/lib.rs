//! thirdeye-core: shared data model and event channel for the thirdeye aid
//!
//! The detection process (thirdeye-eye) and the announcement process
//! (thirdeye-spk) share nothing except the types in this crate and the
//! durable queue behind [`channel::EventPublisher`] / [`channel::EventConsumer`].

pub mod channel;
pub mod config;
pub mod error;
pub mod types;

pub use channel::{EventConsumer, EventDelivery, EventPublisher};
pub use config::ChannelConfig;
pub use error::{Error, Result};
pub use types::{frame_winner, Detection, StableEvent};
