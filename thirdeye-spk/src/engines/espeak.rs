//! espeak-ng TTS engine
//! Offline synthesis via the espeak-ng command line

use crate::engines::TtsEngine;
use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

const MAX_TEXT_LENGTH: usize = 10_000;

/// espeak-ng subprocess engine
pub struct EspeakEngine {
    espeak_path: PathBuf,
}

impl EspeakEngine {
    /// Locate espeak-ng (or the legacy espeak binary) on the PATH.
    pub fn new() -> Result<Self, SpeechError> {
        for candidate in ["espeak-ng", "espeak"] {
            let output = Command::new("which").arg(candidate).output().ok();
            if let Some(output) = output {
                if output.status.success() {
                    let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    info!("TTS engine initialized ({})", path_str);
                    return Ok(Self {
                        espeak_path: PathBuf::from(path_str),
                    });
                }
            }
        }
        Err(SpeechError::Engine(
            "espeak-ng not found. Please install espeak-ng.".to_string(),
        ))
    }

    /// Strip control characters before handing text to the subprocess.
    fn sanitize(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n')
            .take(MAX_TEXT_LENGTH)
            .collect()
    }

    /// Arguments for one synthesis run.
    ///
    /// The `--` terminator keeps text with a leading dash from being parsed
    /// as an espeak flag.
    fn synthesis_args(language: &str, output_path: &str, text: &str) -> Vec<String> {
        vec![
            "-v".to_string(),
            language.to_string(),
            "-w".to_string(),
            output_path.to_string(),
            "--".to_string(),
            text.to_string(),
        ]
    }
}

#[async_trait]
impl TtsEngine for EspeakEngine {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Bytes, SpeechError> {
        if text.is_empty() {
            return Err(SpeechError::Synthesizer("Text cannot be empty".to_string()));
        }
        if text.len() > MAX_TEXT_LENGTH {
            return Err(SpeechError::Synthesizer(format!(
                "Text too long (max {} bytes)",
                MAX_TEXT_LENGTH
            )));
        }
        if language.is_empty() || language.len() > 32 {
            return Err(SpeechError::Synthesizer("Invalid language code".to_string()));
        }

        let sanitized = Self::sanitize(text);

        let temp_file = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .map_err(|e| SpeechError::Engine(format!("Failed to create temp file: {}", e)))?;
        let output_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| SpeechError::Engine("Invalid temp file path".to_string()))?;

        debug!("Synthesizing {} bytes of text", sanitized.len());
        let output = Command::new(&self.espeak_path)
            .args(Self::synthesis_args(language, output_path, &sanitized))
            .output()
            .map_err(|e| SpeechError::Engine(format!("Failed to execute espeak: {}", e)))?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Engine(format!(
                "espeak synthesis failed: {}",
                error_msg
            )));
        }

        let audio_data = std::fs::read(temp_file.path())
            .map_err(|e| SpeechError::Engine(format!("Failed to read audio file: {}", e)))?;
        if audio_data.is_empty() {
            return Err(SpeechError::Engine("espeak produced no audio".to_string()));
        }

        Ok(Bytes::from(audio_data))
    }

    fn is_available(&self) -> bool {
        self.espeak_path.exists()
    }

    fn name(&self) -> &str {
        "espeak"
    }
}
