//! Configuration for thirdeye-spk

use serde::{Deserialize, Serialize};
use thirdeye_core::ChannelConfig;

/// Announcement process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Synthesis language code (espeak voice)
    pub language: String,
    /// Simulated sensor lower bound in meters (ultrasonic dead zone)
    pub min_distance_m: f32,
    /// Simulated sensor upper bound in meters (maximum range)
    pub max_distance_m: f32,
    /// Event channel connection
    pub channel: ChannelConfig,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            min_distance_m: 0.02,
            max_distance_m: 4.0,
            channel: ChannelConfig::default(),
        }
    }
}

impl SpeechConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.language.is_empty() {
            return Err("Language code must not be empty".to_string());
        }
        if self.language.len() > 32 {
            return Err("Language code too long (max 32 chars)".to_string());
        }
        if !self.min_distance_m.is_finite() || !self.max_distance_m.is_finite() {
            return Err("Distance bounds must be finite".to_string());
        }
        if self.min_distance_m < 0.0 {
            return Err("Minimum distance must not be negative".to_string());
        }
        if self.min_distance_m >= self.max_distance_m {
            return Err("Minimum distance must be below maximum distance".to_string());
        }
        self.channel.validate()
    }
}
