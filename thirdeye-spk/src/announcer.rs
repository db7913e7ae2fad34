//! Queue consumer and announcement loop
//!
//! Messages are pulled one at a time and acknowledged only after handling
//! finishes. Every outcome acknowledges: a malformed payload can never be
//! processed, and a failed synthesis or playback is not worth a retry that
//! would clog the queue behind it. Only a consumer crash or disconnect
//! leaves a message unacked, and the broker then redelivers it.

use crate::config::SpeechConfig;
use crate::distance::DistanceEstimator;
use crate::engines::TtsEngine;
use crate::error::SpeechError;
use crate::playback::AudioPlayer;
use std::sync::Arc;
use thirdeye_core::{EventConsumer, StableEvent};
use tracing::{error, info, warn};

/// Render the spoken sentence for one event.
pub fn format_announcement(label: &str, distance_m: f32) -> String {
    format!("{} is {:.2} meters away, take action.", label, distance_m)
}

/// How one delivery was resolved. All three outcomes are acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Decoded, synthesized, and played to completion.
    Announced,
    /// Payload did not decode; skipped permanently.
    Malformed,
    /// Decoded but synthesis or playback failed; skipped.
    Failed,
}

/// Consumes stable events and speaks them, one at a time.
pub struct Announcer {
    language: String,
    distance: Arc<dyn DistanceEstimator>,
    engine: Arc<dyn TtsEngine>,
    player: Arc<dyn AudioPlayer>,
}

impl Announcer {
    pub fn new(
        config: &SpeechConfig,
        distance: Arc<dyn DistanceEstimator>,
        engine: Arc<dyn TtsEngine>,
        player: Arc<dyn AudioPlayer>,
    ) -> Self {
        Self {
            language: config.language.clone(),
            distance,
            engine,
            player,
        }
    }

    /// Speak one event: sample a distance, synthesize, play to completion.
    pub async fn announce(&self, event: &StableEvent) -> Result<(), SpeechError> {
        let distance_m = self.distance.sample();
        let text = format_announcement(&event.label, distance_m);
        info!("{}", text);

        let audio = self.engine.synthesize(&text, &self.language).await?;
        self.player.play(&audio).await
    }

    /// Resolve one raw delivery payload.
    pub async fn handle_payload(&self, payload: &[u8]) -> HandleOutcome {
        let event = match StableEvent::from_payload(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!("Received malformed event payload, skipping: {}", e);
                return HandleOutcome::Malformed;
            }
        };

        match self.announce(&event).await {
            Ok(()) => HandleOutcome::Announced,
            Err(e) => {
                error!("Announcement for '{}' failed: {}", event.label, e);
                HandleOutcome::Failed
            }
        }
    }

    /// Blocking receive loop with manual acknowledgment.
    ///
    /// Exits on user interrupt, broker-initiated close, or an unrecoverable
    /// channel failure. Cancellation is checked between messages; an
    /// announcement in flight always finishes first.
    pub async fn run(&self, consumer: &mut EventConsumer) -> Result<(), SpeechError> {
        info!("Starting to consume messages...");
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Stopped by user.");
                    break;
                }
                delivery = consumer.next_delivery() => {
                    match delivery {
                        Ok(Some(delivery)) => {
                            self.handle_payload(delivery.payload()).await;
                            let tag = delivery.delivery_tag();
                            if let Err(e) = delivery.ack().await {
                                error!("Failed to acknowledge delivery {}: {}", tag, e);
                            }
                        }
                        Ok(None) => {
                            info!("Connection closed by broker.");
                            break;
                        }
                        Err(e) => {
                            error!("Event channel failure: {}", e);
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
