// SPDX-License-Identifier: MPL-2.0
//! Chrominance prediction port definition.
//!
//! This module defines the [`ChromaPredictor`] trait, the single inference
//! call of the colorization pipeline: given the mean-centered lightness
//! plane at the network's input size, predict the two chrominance planes.
//!
//! # Design Notes
//!
//! - Input tensor is NCHW `[1, 1, H, W]` with `H x W` = [`PredictorCapabilities::input_size`]
//! - Output tensor is NCHW `[1, 2, h, w]`; `h x w` is whatever the network produces
//! - The trait is `Send + Sync` so one loaded model can serve concurrent requests

use crate::config::defaults::NETWORK_INPUT_SIZE;
use ndarray::Array4;
use thiserror::Error;

// =============================================================================
// PredictError
// =============================================================================

/// Errors that can occur during a forward pass.
#[derive(Debug, Clone, Error)]
pub enum PredictError {
    /// The model session is not usable (poisoned lock, not loaded).
    #[error("Model is not ready")]
    ModelNotReady,

    /// The input tensor does not match what the model expects.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Inference failed inside the runtime.
    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    /// The runtime returned a tensor the pipeline cannot interpret.
    #[error("Unexpected model output: {0}")]
    UnexpectedOutput(String),
}

// =============================================================================
// PredictorCapabilities
// =============================================================================

/// Describes a predictor before invoking it.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorCapabilities {
    /// Human-readable name of the predictor.
    pub name: &'static str,

    /// Spatial input size (width, height) the lightness plane is resized to.
    pub input_size: (u32, u32),
}

impl PredictorCapabilities {
    /// Creates capabilities with the standard 224x224 network input.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            input_size: (NETWORK_INPUT_SIZE, NETWORK_INPUT_SIZE),
        }
    }
}

// =============================================================================
// ChromaPredictor Trait
// =============================================================================

/// Port for the chrominance-predicting network.
///
/// Infrastructure adapters implement this with ONNX Runtime; tests implement
/// it with deterministic fakes.
///
/// # Example
///
/// ```ignore
/// use chroma_lens::application::port::ChromaPredictor;
/// use chroma_lens::media::colorize::colorize;
///
/// fn recolor(model: &dyn ChromaPredictor, image: &image_rs::DynamicImage) {
///     let colorized = colorize(model, image)?;
/// }
/// ```
pub trait ChromaPredictor: Send + Sync {
    /// Runs one forward pass.
    ///
    /// # Errors
    ///
    /// Returns a [`PredictError`] if the model is unusable, the input shape is
    /// wrong, or the runtime fails.
    fn predict(&self, lightness: &Array4<f32>) -> Result<Array4<f32>, PredictError>;

    /// Returns the capabilities of this predictor.
    fn capabilities(&self) -> PredictorCapabilities;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ConstantChroma;

    #[test]
    fn predict_error_display() {
        let err = PredictError::ModelNotReady;
        assert_eq!(format!("{err}"), "Model is not ready");

        let err = PredictError::InferenceFailed("out of memory".to_string());
        assert!(format!("{err}").contains("out of memory"));
    }

    #[test]
    fn capabilities_default_to_network_input() {
        let caps = PredictorCapabilities::new("Test");
        assert_eq!(caps.name, "Test");
        assert_eq!(caps.input_size, (224, 224));
    }

    #[test]
    fn mock_predictor_returns_two_planes() {
        let predictor = ConstantChroma { a: 3.0, b: -4.0 };
        let out = predictor
            .predict(&Array4::zeros((1, 1, 224, 224)))
            .expect("mock should predict");
        assert_eq!(out.shape(), &[1, 2, 56, 56]);
        assert_eq!(out[[0, 0, 10, 10]], 3.0);
        assert_eq!(out[[0, 1, 10, 10]], -4.0);
    }

    #[test]
    fn predictors_are_usable_as_trait_objects() {
        let predictor: Box<dyn ChromaPredictor> = Box::new(ConstantChroma::default());
        assert_eq!(predictor.capabilities().input_size, (224, 224));
    }
}
