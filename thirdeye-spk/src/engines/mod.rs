//! TTS engine implementations

pub mod espeak;

use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;

pub use espeak::EspeakEngine;

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync {
    /// Synthesize text to speech audio (WAV bytes)
    async fn synthesize(&self, text: &str, language: &str) -> Result<Bytes, SpeechError>;

    /// Check if engine is available
    fn is_available(&self) -> bool;

    /// Get engine name
    fn name(&self) -> &str;
}
