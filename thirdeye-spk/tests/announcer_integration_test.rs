//! Integration tests for the announcement path

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thirdeye_core::StableEvent;
use thirdeye_spk::announcer::HandleOutcome;
use thirdeye_spk::{
    format_announcement, Announcer, AudioPlayer, DistanceEstimator, SpeechConfig, SpeechError,
    TtsEngine,
};

struct FixedDistance(f32);

impl DistanceEstimator for FixedDistance {
    fn sample(&self) -> f32 {
        self.0
    }
}

#[derive(Default)]
struct SpyEngine {
    spoken: Mutex<Vec<String>>,
}

#[async_trait]
impl TtsEngine for SpyEngine {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Bytes, SpeechError> {
        assert_eq!(language, "en");
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(Bytes::from_static(b"RIFFfake"))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "spy"
    }
}

#[derive(Default)]
struct SpyPlayer {
    plays: AtomicUsize,
}

#[async_trait]
impl AudioPlayer for SpyPlayer {
    async fn play(&self, audio: &Bytes) -> Result<(), SpeechError> {
        assert!(!audio.is_empty());
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_mixed_delivery_stream_is_fully_drained() {
    // A burst with a malformed message in the middle: every message resolves,
    // and the bad one does not block the ones behind it.
    let engine = Arc::new(SpyEngine::default());
    let player = Arc::new(SpyPlayer::default());
    let announcer = Announcer::new(
        &SpeechConfig::default(),
        Arc::new(FixedDistance(1.5)),
        engine.clone(),
        player.clone(),
    );

    let payloads: Vec<Vec<u8>> = vec![
        StableEvent::new("person").to_payload().unwrap(),
        b"{broken".to_vec(),
        StableEvent::new("car").to_payload().unwrap(),
    ];

    let mut outcomes = Vec::new();
    for payload in &payloads {
        outcomes.push(announcer.handle_payload(payload).await);
    }

    assert_eq!(
        outcomes,
        vec![
            HandleOutcome::Announced,
            HandleOutcome::Malformed,
            HandleOutcome::Announced,
        ]
    );
    assert_eq!(player.plays.load(Ordering::SeqCst), 2);

    let spoken = engine.spoken.lock().unwrap();
    assert_eq!(spoken.len(), 2);
    assert_eq!(spoken[0], format_announcement("person", 1.5));
    assert_eq!(spoken[1], format_announcement("car", 1.5));
}

#[tokio::test]
async fn test_announcement_sentence_shape() {
    let engine = Arc::new(SpyEngine::default());
    let announcer = Announcer::new(
        &SpeechConfig::default(),
        Arc::new(FixedDistance(0.875)),
        engine.clone(),
        Arc::new(SpyPlayer::default()),
    );

    announcer
        .announce(&StableEvent::new("stop sign"))
        .await
        .unwrap();

    assert_eq!(
        engine.spoken.lock().unwrap()[0],
        "stop sign is 0.88 meters away, take action."
    );
}
