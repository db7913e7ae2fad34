//! Audio playback
//!
//! Playback blocks until the clip finishes. That is the system's
//! backpressure point: the next queued event is not pulled while the user is
//! still hearing the current one.

use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

/// Plays one synthesized clip to completion.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, audio: &Bytes) -> Result<(), SpeechError>;
}

/// Subprocess WAV player (aplay/paplay).
pub struct CommandPlayer {
    player_path: PathBuf,
}

impl CommandPlayer {
    /// Locate a WAV-capable player on the PATH.
    pub fn new() -> Result<Self, SpeechError> {
        for candidate in ["aplay", "paplay", "afplay"] {
            let output = Command::new("which").arg(candidate).output().ok();
            if let Some(output) = output {
                if output.status.success() {
                    let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    info!("Audio player initialized ({})", path_str);
                    return Ok(Self {
                        player_path: PathBuf::from(path_str),
                    });
                }
            }
        }
        Err(SpeechError::Playback(
            "No audio player found (tried aplay, paplay, afplay)".to_string(),
        ))
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, audio: &Bytes) -> Result<(), SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::Playback("No audio to play".to_string()));
        }

        let temp_file = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .map_err(|e| SpeechError::Playback(format!("Failed to create temp file: {}", e)))?;
        std::fs::write(temp_file.path(), audio)
            .map_err(|e| SpeechError::Playback(format!("Failed to write audio file: {}", e)))?;

        debug!("Playing {} bytes of audio", audio.len());
        let status = Command::new(&self.player_path)
            .arg(temp_file.path())
            .status()
            .map_err(|e| SpeechError::Playback(format!("Failed to launch player: {}", e)))?;

        if !status.success() {
            return Err(SpeechError::Playback(format!(
                "Player exited with status {}",
                status
            )));
        }
        Ok(())
    }
}
