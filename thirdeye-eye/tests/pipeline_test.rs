//! End-to-end tests for the frame-to-event pipeline

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thirdeye_core::{Detection, StableEvent};
use thirdeye_eye::{DetectionPipeline, Detector, EventSink, Frame, VisionConfig, VisionError};

/// Detector that replays a fixed sequence of per-frame detection sets.
struct ScriptedDetector {
    frames: Mutex<Vec<Vec<Detection>>>,
}

impl ScriptedDetector {
    fn new(frames: Vec<Vec<Detection>>) -> Arc<Self> {
        Arc::new(Self {
            frames: Mutex::new(frames),
        })
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    async fn detect(&self, _frame: &Frame, _frame_seq: u64) -> Result<Vec<Detection>, VisionError> {
        let mut frames = self.frames.lock().unwrap();
        if frames.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(frames.remove(0))
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    published: Arc<Mutex<Vec<StableEvent>>>,
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn publish(&self, event: &StableEvent) -> thirdeye_core::Result<()> {
        self.published.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn sole(label: &str) -> Vec<Detection> {
    vec![Detection::new(label, 0.9)]
}

fn frame() -> Frame {
    Frame::new(1, 1, vec![0u8; 3]).unwrap()
}

async fn run_frames(
    script: Vec<Vec<Detection>>,
    streak_threshold: u32,
) -> Vec<StableEvent> {
    let config = VisionConfig {
        streak_threshold,
        ..VisionConfig::default()
    };
    let sink = RecordingSink::default();
    let published = sink.published.clone();
    let count = script.len() as u64;
    let mut pipeline = DetectionPipeline::new(&config, ScriptedDetector::new(script), Some(sink));

    let frame = frame();
    for seq in 1..=count {
        pipeline.process_frame(&frame, seq).await;
    }
    let events = published.lock().unwrap().clone();
    events
}

#[tokio::test]
async fn test_five_in_a_row_publishes_exactly_one_event() {
    let events = run_frames(vec![sole("A"); 5], 5).await;
    assert_eq!(events, vec![StableEvent::new("A")]);
}

#[tokio::test]
async fn test_label_switch_defers_the_event() {
    // [A,A,A,B,A,A,A,A,A]: the break at B forces a fresh run of five.
    let script = vec![
        sole("A"),
        sole("A"),
        sole("A"),
        sole("B"),
        sole("A"),
        sole("A"),
        sole("A"),
        sole("A"),
        sole("A"),
    ];
    let events = run_frames(script, 5).await;
    assert_eq!(events, vec![StableEvent::new("A")]);
}

#[tokio::test]
async fn test_empty_frame_mid_streak_suppresses_event() {
    let script = vec![sole("A"), sole("A"), sole("A"), Vec::new(), sole("A")];
    let events = run_frames(script, 5).await;
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_lingering_object_is_reannounced_per_full_run() {
    let events = run_frames(vec![sole("A"); 15], 5).await;
    assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn test_winner_tracks_highest_score_across_noise() {
    let noisy = vec![
        Detection::new("chair", 0.55),
        Detection::new("person", 0.92),
        Detection::new("cup", 0.61),
    ];
    let events = run_frames(vec![noisy; 5], 5).await;
    assert_eq!(events, vec![StableEvent::new("person")]);
}
