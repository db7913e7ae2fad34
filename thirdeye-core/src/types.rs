//! Detection and event types shared by both processes

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// A single labeled, scored detection from the vision model.
///
/// Produced once per object per frame; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    /// Model confidence in `[0, 1]`.
    pub score: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A detection confirmed across consecutive frames, ready for announcement.
///
/// This is the only payload that crosses the event channel. The wire form is
/// a single JSON object with a `label` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableEvent {
    pub label: String,
}

impl StableEvent {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Serialize to the wire payload.
    pub fn to_payload(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from the wire payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(payload).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// Pick the winning detection of a frame: the highest-scoring entry.
///
/// Ties resolve to the first-encountered detection, preserving the model's
/// own output order rather than re-sorting. Detections with a non-finite
/// score are ignored, so a frame whose every score is malformed has no
/// winner, exactly like an empty frame.
pub fn frame_winner(detections: &[Detection]) -> Option<&Detection> {
    let mut winner: Option<&Detection> = None;
    for det in detections {
        if !det.score.is_finite() {
            continue;
        }
        match winner {
            Some(best) if det.score <= best.score => {}
            _ => winner = Some(det),
        }
    }
    winner
}
