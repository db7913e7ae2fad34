//! Detection backend seam

use crate::error::VisionError;
use async_trait::async_trait;
use thirdeye_core::Detection;

/// A decoded camera frame, RGB8 row-major.
///
/// Keeping the pixel buffer plain lets the detector seam stay independent of
/// the capture backend.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, VisionError> {
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(VisionError::Processing(format!(
                "Frame buffer size mismatch: expected {} bytes for {}x{} RGB, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Object-detection backend.
///
/// One call per frame; the pipeline awaits each result before submitting the
/// next frame, so completions always arrive in submission order.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Classify one frame into labeled, scored detections.
    async fn detect(&self, frame: &Frame, frame_seq: u64) -> Result<Vec<Detection>, VisionError>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}
