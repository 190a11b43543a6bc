// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and other common test helpers.
//!
//! This module re-exports the `approx` crate's assertion macros for float comparison,
//! which properly handle floating-point precision issues that `assert_eq!` cannot.

// Re-export approx macros for convenient use in tests
pub use approx::assert_abs_diff_eq;

use crate::application::port::{ChromaPredictor, PredictError, PredictorCapabilities};
use ndarray::{s, Array4};

/// Default epsilon for f32 plane values after resampling or decoding.
pub const F32_EPSILON: f32 = 1e-4;

/// Predictor returning uniform chrominance at the network's 56x56 output size.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantChroma {
    pub a: f32,
    pub b: f32,
}

impl ChromaPredictor for ConstantChroma {
    fn predict(&self, _lightness: &Array4<f32>) -> Result<Array4<f32>, PredictError> {
        let mut out = Array4::<f32>::zeros((1, 2, 56, 56));
        out.slice_mut(s![0, 0, .., ..]).fill(self.a);
        out.slice_mut(s![0, 1, .., ..]).fill(self.b);
        Ok(out)
    }

    fn capabilities(&self) -> PredictorCapabilities {
        PredictorCapabilities::new("Constant")
    }
}
