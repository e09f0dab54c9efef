//! Confidence gate - first stage of the stabilizer
//!
//! Predictions below the threshold never reach the vote window.

use crate::types::Prediction;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

#[derive(Debug, Clone, Copy)]
pub struct ConfidenceGate {
    /// Minimum confidence to accept a prediction
    threshold: f32,
}

impl ConfidenceGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Inclusive: a confidence exactly at the threshold is admitted. NaN never is.
    pub fn admit(&self, prediction: &Prediction) -> bool {
        prediction.confidence >= self.threshold
    }
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}
