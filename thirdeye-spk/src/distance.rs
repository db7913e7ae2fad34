//! Distance estimation capability
//!
//! The announcer only needs `sample()`; a real rangefinder driver slots in
//! behind the same trait without touching the announcement logic.

use rand::Rng;

/// Supplies one distance reading per announcement, in meters.
pub trait DistanceEstimator: Send + Sync {
    fn sample(&self) -> f32;
}

/// Stand-in for an ultrasonic rangefinder: uniformly distributed readings
/// between the sensor's dead zone and its maximum range.
#[derive(Debug, Clone)]
pub struct SimulatedRangeSensor {
    min_m: f32,
    max_m: f32,
}

impl SimulatedRangeSensor {
    /// Bounds are expected to be pre-validated (`SpeechConfig::validate`).
    pub fn new(min_m: f32, max_m: f32) -> Self {
        Self { min_m, max_m }
    }
}

impl Default for SimulatedRangeSensor {
    fn default() -> Self {
        Self::new(0.02, 4.0)
    }
}

impl DistanceEstimator for SimulatedRangeSensor {
    fn sample(&self) -> f32 {
        rand::thread_rng().gen_range(self.min_m..self.max_m)
    }
}
