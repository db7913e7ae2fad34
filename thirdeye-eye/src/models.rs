//! ONNX-backed object detection

use crate::config::VisionConfig;
use crate::detector::{Detector, Frame};
use crate::error::VisionError;
use async_trait::async_trait;
use image::imageops::FilterType;
use image::RgbImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Arc;
use thirdeye_core::Detection;
use tracing::{debug, info};

/// COCO class names (80 classes)
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat",
    "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack",
    "umbrella", "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball",
    "kite", "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket",
    "bottle", "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple",
    "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair",
    "couch", "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator",
    "book", "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

const INPUT_SIZE: u32 = 640;

/// ONNX Runtime detection backend.
pub struct OnnxDetector {
    session: Arc<Session>,
    score_threshold: f32,
}

impl OnnxDetector {
    /// Load the detection model from disk.
    pub fn new(model_path: &Path, config: &VisionConfig) -> Result<Self, VisionError> {
        ort::init()
            .with_name("thirdeye-eye")
            .commit()
            .map_err(|e| VisionError::Model(format!("Failed to init ONNX runtime: {}", e)))?;

        let session = Session::builder()
            .and_then(|builder| {
                builder.with_execution_providers([CPUExecutionProvider::default().build()])
            })
            .and_then(|builder| builder.commit_from_file(model_path))
            .map_err(|e| VisionError::Model(format!("Failed to load detection model: {}", e)))?;

        info!("Detection model loaded from {:?}", model_path);

        Ok(Self {
            session: Arc::new(session),
            score_threshold: config.score_threshold,
        })
    }

    /// Resize to the model input and pack as a normalized [1, 3, H, W] tensor.
    fn preprocess(&self, frame: &Frame) -> Result<Tensor<f32>, VisionError> {
        let image = RgbImage::from_raw(frame.width, frame.height, frame.pixels.clone())
            .ok_or_else(|| VisionError::Processing("Frame buffer too short for image".to_string()))?;
        let resized = image::imageops::resize(&image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

        let side = INPUT_SIZE as usize;
        let mut chw = vec![0.0f32; 3 * side * side];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for channel in 0..3 {
                chw[channel * side * side + y * side + x] = pixel.0[channel] as f32 / 255.0;
            }
        }

        Tensor::from_array(([1usize, 3, side, side], chw))
            .map_err(|e| VisionError::Model(format!("Failed to create input tensor: {}", e)))
    }
}

/// Extract per-box detections from a flat [batch, boxes, stride] output.
///
/// Per box: coords at 0..4, objectness at 4, class probabilities from 5.
/// Only labels and scores are kept; box-level suppression is unnecessary
/// because downstream consumes a single top-scoring label per frame.
fn detections_from_output(data: &[f32], stride: usize, score_threshold: f32) -> Vec<Detection> {
    let mut detections = Vec::new();
    if stride < 5 + COCO_CLASSES.len() {
        return detections;
    }

    for chunk in data.chunks_exact(stride) {
        let objectness = chunk[4];
        if !objectness.is_finite() || objectness <= score_threshold {
            continue;
        }

        let mut best_class = 0;
        let mut best_prob = 0.0f32;
        for (class_idx, prob) in chunk[5..5 + COCO_CLASSES.len()].iter().enumerate() {
            if *prob > best_prob {
                best_prob = *prob;
                best_class = class_idx;
            }
        }

        let score = objectness * best_prob;
        if score.is_finite() && score > score_threshold {
            detections.push(Detection::new(COCO_CLASSES[best_class], score));
        }
    }
    detections
}

#[async_trait]
impl Detector for OnnxDetector {
    async fn detect(&self, frame: &Frame, frame_seq: u64) -> Result<Vec<Detection>, VisionError> {
        debug!("Running detection on frame {}", frame_seq);
        let input = self.preprocess(frame)?;
        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(|e| VisionError::Model(format!("Inference failed: {}", e)))?;

        let output = match outputs.iter().next() {
            Some((_, output)) => output,
            None => return Ok(Vec::new()),
        };
        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| VisionError::Model(format!("Failed to extract output tensor: {}", e)))?;

        debug!("Model output shape: {:?}", shape);
        if shape.len() < 3 {
            return Err(VisionError::Model(format!(
                "Unexpected model output shape: {:?}",
                shape
            )));
        }

        let detections = detections_from_output(data, shape[2] as usize, self.score_threshold);
        debug!("Model produced {} detections", detections.len());
        Ok(detections)
    }

    fn name(&self) -> &str {
        "onnx"
    }
}
