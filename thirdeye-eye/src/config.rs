//! Configuration for thirdeye-eye

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thirdeye_core::ChannelConfig;

/// Default number of consecutive matching frames before an event fires.
pub const DEFAULT_STREAK_THRESHOLD: u32 = 5;

/// Vision process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Path to the ONNX detection model file
    pub model_path: PathBuf,
    /// USB camera device index (0, 1, 2, etc.)
    pub camera_id: u32,
    /// Capture width in pixels
    pub frame_width: u32,
    /// Capture height in pixels
    pub frame_height: u32,
    /// Mirror frames horizontally before detection
    pub flip_horizontal: bool,
    /// Minimum model confidence for a detection to count
    pub score_threshold: f32,
    /// Consecutive-frame count required for a stable event
    pub streak_threshold: u32,
    /// Event channel connection
    pub channel: ChannelConfig,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("efficientdet_lite2.onnx"),
            camera_id: 0,
            frame_width: 1280,
            frame_height: 720,
            flip_horizontal: true,
            score_threshold: 0.5,
            streak_threshold: DEFAULT_STREAK_THRESHOLD,
            channel: ChannelConfig::default(),
        }
    }
}

impl VisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err("Frame resolution must be non-zero".to_string());
        }

        if self.frame_width > 7680 || self.frame_height > 4320 {
            return Err("Frame resolution too large (max 8K)".to_string());
        }

        if self.camera_id > 100 {
            return Err("Camera ID too large (max 100)".to_string());
        }

        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err("Score threshold must be in [0, 1]".to_string());
        }

        if self.streak_threshold == 0 {
            return Err("Streak threshold must be at least 1".to_string());
        }

        self.channel.validate()
    }
}
