//! Frame-to-event pipeline
//!
//! Glues the detector, the stability filter, and the event channel producer
//! together. Detection and publish failures are logged and absorbed here:
//! nothing that happens downstream of the camera may stop the capture loop.

use crate::config::VisionConfig;
use crate::detector::{Detector, Frame};
use crate::error::VisionError;
use crate::stability::StabilityFilter;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use thirdeye_core::{EventPublisher, StableEvent};
use tracing::{debug, info, warn};

/// Producer side of the event channel, as seen by the pipeline.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &StableEvent) -> thirdeye_core::Result<()>;
}

#[async_trait]
impl EventSink for EventPublisher {
    async fn publish(&self, event: &StableEvent) -> thirdeye_core::Result<()> {
        EventPublisher::publish(self, event).await
    }
}

/// Detection-to-event pipeline for one camera stream.
///
/// The sink is optional: when the broker was unreachable at startup the
/// process keeps detecting and only the handoff is skipped.
pub struct DetectionPipeline<S: EventSink> {
    detector: Arc<dyn Detector>,
    filter: StabilityFilter,
    sink: Option<S>,
    fps: FpsCounter,
}

impl<S: EventSink> DetectionPipeline<S> {
    pub fn new(config: &VisionConfig, detector: Arc<dyn Detector>, sink: Option<S>) -> Self {
        if sink.is_none() {
            warn!("Event channel unavailable; detections will not be announced");
        }
        Self {
            detector,
            filter: StabilityFilter::new(config.streak_threshold),
            sink,
            fps: FpsCounter::new(),
        }
    }

    /// Run one frame through detect → debounce → publish.
    ///
    /// Returns the stable event the frame produced, if any. A detector error
    /// is logged and treated as an empty frame (breaking the streak); a
    /// publish error is logged and dropped.
    pub async fn process_frame(&mut self, frame: &Frame, frame_seq: u64) -> Option<StableEvent> {
        if let Some(fps) = self.fps.tick() {
            debug!("Capture rate: {:.1} fps", fps);
        }

        let detections = match self.detector.detect(frame, frame_seq).await {
            Ok(detections) => detections,
            Err(e) => {
                warn!("Detection failed on frame {}: {}", frame_seq, e);
                Vec::new()
            }
        };

        let event = self.filter.on_frame_result(&detections)?;
        info!("Stable detection: {}", event.label);

        if let Some(ref sink) = self.sink {
            if let Err(e) = sink.publish(&event).await {
                warn!("Failed to publish stable event '{}': {}", event.label, e);
            }
        }
        Some(event)
    }

    /// Detector backend name, for startup logs.
    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    /// Give the event sink back so the caller can release it at shutdown.
    pub fn into_sink(self) -> Option<S> {
        self.sink
    }
}

/// Frames-per-second accounting over ten-frame windows.
struct FpsCounter {
    counter: u64,
    window_start: Instant,
}

const FPS_WINDOW: u64 = 10;

impl FpsCounter {
    fn new() -> Self {
        Self {
            counter: 0,
            window_start: Instant::now(),
        }
    }

    /// Count one frame; yields the rate at the end of each window.
    fn tick(&mut self) -> Option<f64> {
        self.counter += 1;
        if self.counter % FPS_WINDOW != 0 {
            return None;
        }
        let elapsed = self.window_start.elapsed().as_secs_f64();
        self.window_start = Instant::now();
        if elapsed > 0.0 {
            Some(FPS_WINDOW as f64 / elapsed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use thirdeye_core::Detection;

    /// Detector that replays a fixed script of per-frame results.
    struct ScriptedDetector {
        script: Mutex<Vec<Result<Vec<Detection>, VisionError>>>,
    }

    impl ScriptedDetector {
        fn new(script: Vec<Result<Vec<Detection>, VisionError>>) -> Self {
            Self {
                script: Mutex::new(script),
            }
        }
    }

    #[async_trait]
    impl Detector for ScriptedDetector {
        async fn detect(
            &self,
            _frame: &Frame,
            _frame_seq: u64,
        ) -> Result<Vec<Detection>, VisionError> {
            self.script
                .lock()
                .unwrap()
                .remove(0)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        published: Mutex<Vec<StableEvent>>,
        fail: bool,
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn publish(&self, event: &StableEvent) -> thirdeye_core::Result<()> {
            if self.fail {
                return Err(thirdeye_core::Error::Serialization("injected".to_string()));
            }
            self.published.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn test_config() -> VisionConfig {
        VisionConfig {
            streak_threshold: 3,
            ..VisionConfig::default()
        }
    }

    fn blank_frame() -> Frame {
        Frame::new(1, 1, vec![0u8; 3]).unwrap()
    }

    fn person_frame() -> Result<Vec<Detection>, VisionError> {
        Ok(vec![Detection::new("person", 0.9)])
    }

    #[tokio::test]
    async fn test_pipeline_publishes_after_streak() {
        let detector = Arc::new(ScriptedDetector::new(vec![
            person_frame(),
            person_frame(),
            person_frame(),
        ]));
        let mut pipeline =
            DetectionPipeline::new(&test_config(), detector, Some(RecordingSink::default()));

        let frame = blank_frame();
        assert!(pipeline.process_frame(&frame, 1).await.is_none());
        assert!(pipeline.process_frame(&frame, 2).await.is_none());
        let event = pipeline.process_frame(&frame, 3).await;
        assert_eq!(event, Some(StableEvent::new("person")));

        let sink = pipeline.sink.as_ref().unwrap();
        assert_eq!(
            *sink.published.lock().unwrap(),
            vec![StableEvent::new("person")]
        );
    }

    #[tokio::test]
    async fn test_detector_error_breaks_streak() {
        let detector = Arc::new(ScriptedDetector::new(vec![
            person_frame(),
            person_frame(),
            Err(VisionError::Model("inference failed".to_string())),
            person_frame(),
            person_frame(),
            person_frame(),
        ]));
        let mut pipeline =
            DetectionPipeline::new(&test_config(), detector, Some(RecordingSink::default()));

        let frame = blank_frame();
        for seq in 1..=5 {
            assert!(pipeline.process_frame(&frame, seq).await.is_none());
        }
        assert!(pipeline.process_frame(&frame, 6).await.is_some());
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_stop_pipeline() {
        let detector = Arc::new(ScriptedDetector::new(
            (0..6).map(|_| person_frame()).collect(),
        ));
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let mut pipeline = DetectionPipeline::new(&test_config(), detector, Some(sink));

        let frame = blank_frame();
        let mut events = 0;
        for seq in 1..=6 {
            if pipeline.process_frame(&frame, seq).await.is_some() {
                events += 1;
            }
        }
        // Both streaks still complete even though every publish failed.
        assert_eq!(events, 2);
    }

    #[tokio::test]
    async fn test_pipeline_without_sink_still_filters() {
        let detector = Arc::new(ScriptedDetector::new(vec![
            person_frame(),
            person_frame(),
            person_frame(),
        ]));
        let mut pipeline: DetectionPipeline<RecordingSink> =
            DetectionPipeline::new(&test_config(), detector, None);

        let frame = blank_frame();
        pipeline.process_frame(&frame, 1).await;
        pipeline.process_frame(&frame, 2).await;
        assert!(pipeline.process_frame(&frame, 3).await.is_some());
    }
}
