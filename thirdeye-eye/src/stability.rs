//! Streak-based debouncing of per-frame detection results
//!
//! A raw classification stream flickers: labels drop out for a frame, swap
//! with a runner-up, or disappear entirely. The filter only promotes a label
//! to a stable event once it has won the configured number of consecutive
//! frames, and then arms itself again so the same object is not re-announced
//! every frame while it stays in view.

use crate::config::DEFAULT_STREAK_THRESHOLD;
use thirdeye_core::{frame_winner, Detection, StableEvent};

/// Per-stream debouncing state.
///
/// `streak` counts the consecutive most-recent frames (including the current
/// one) whose winner matches `last_label`. Owned exclusively by the filter;
/// frames must be fed in capture order.
#[derive(Debug, Clone, Default)]
struct StabilityState {
    last_label: Option<String>,
    streak: u32,
}

/// Turns the per-frame winner stream into stable events.
#[derive(Debug, Clone)]
pub struct StabilityFilter {
    state: StabilityState,
    threshold: u32,
}

impl Default for StabilityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_STREAK_THRESHOLD)
    }
}

impl StabilityFilter {
    /// Create a filter that fires after `threshold` consecutive wins.
    ///
    /// A zero threshold is clamped to 1; `VisionConfig::validate` rejects it
    /// before a filter is ever built from config.
    pub fn new(threshold: u32) -> Self {
        Self {
            state: StabilityState::default(),
            threshold: threshold.max(1),
        }
    }

    /// Feed one completed frame's detections; returns a stable event exactly
    /// when the winning label reaches the threshold streak.
    ///
    /// Never fails: an empty or unusable detection set simply breaks the
    /// current streak.
    pub fn on_frame_result(&mut self, detections: &[Detection]) -> Option<StableEvent> {
        let current_label = frame_winner(detections).map(|det| det.label.clone());

        match (&current_label, &self.state.last_label) {
            (Some(current), Some(last)) if current == last => {
                self.state.streak += 1;
            }
            (Some(_), _) => {
                self.state.streak = 1;
            }
            (None, _) => {
                self.state.streak = 0;
            }
        }
        self.state.last_label = current_label;

        if self.state.streak == self.threshold {
            // Re-arm: the same label must win another full run of frames
            // before it is announced again.
            self.state.streak = 0;
            let label = self.state.last_label.clone()?;
            return Some(StableEvent::new(label));
        }
        None
    }

    /// Current streak length, for diagnostics.
    pub fn streak(&self) -> u32 {
        self.state.streak
    }
}
