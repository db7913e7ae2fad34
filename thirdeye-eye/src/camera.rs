//! USB webcam capture

use crate::config::VisionConfig;
use crate::detector::Frame;
use crate::error::VisionError;
use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{VideoCapture, CAP_ANY, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH};
use tracing::info;

/// Blocking camera reader for the capture loop.
///
/// Capture is deliberately sequential: one frame is read, classified, and
/// debounced before the next read. The camera never waits on the announcer.
pub struct Camera {
    capture: VideoCapture,
    flip_horizontal: bool,
}

impl Camera {
    /// Open the configured camera device.
    ///
    /// An unopenable camera is the one fatal startup error in the detection
    /// process; callers exit with the message rather than retrying.
    pub fn open(config: &VisionConfig) -> Result<Self, VisionError> {
        let mut capture = VideoCapture::new(config.camera_id as i32, CAP_ANY).map_err(|e| {
            VisionError::Camera(format!("Failed to open camera {}: {}", config.camera_id, e))
        })?;

        let opened = capture.is_opened().map_err(|e| {
            VisionError::Camera(format!("Camera {} not opened: {}", config.camera_id, e))
        })?;
        if !opened {
            return Err(VisionError::Camera(format!(
                "Camera {} failed to open. Please verify your webcam settings.",
                config.camera_id
            )));
        }

        capture
            .set(CAP_PROP_FRAME_WIDTH, config.frame_width as f64)
            .map_err(|e| VisionError::Camera(format!("Failed to set width: {}", e)))?;
        capture
            .set(CAP_PROP_FRAME_HEIGHT, config.frame_height as f64)
            .map_err(|e| VisionError::Camera(format!("Failed to set height: {}", e)))?;

        info!(
            "Camera {} initialized at {}x{}",
            config.camera_id, config.frame_width, config.frame_height
        );

        Ok(Self {
            capture,
            flip_horizontal: config.flip_horizontal,
        })
    }

    /// Block until the next frame is available and return it as RGB8.
    pub fn read_frame(&mut self) -> Result<Frame, VisionError> {
        let mut bgr = Mat::default();
        let got_frame = self
            .capture
            .read(&mut bgr)
            .map_err(|e| VisionError::Camera(format!("Failed to read frame: {}", e)))?;
        if !got_frame || bgr.empty() {
            return Err(VisionError::Camera(
                "Unable to read from webcam. Please verify your webcam settings.".to_string(),
            ));
        }

        let mut oriented = Mat::default();
        let mat = if self.flip_horizontal {
            opencv::core::flip(&bgr, &mut oriented, 1)?;
            &oriented
        } else {
            &bgr
        };

        // The detection model expects RGB input.
        let mut rgb = Mat::default();
        imgproc::cvt_color(mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let pixels = rgb
            .data_bytes()
            .map_err(|e| VisionError::Camera(format!("Failed to access frame data: {}", e)))?
            .to_vec();

        Frame::new(width, height, pixels)
    }
}
