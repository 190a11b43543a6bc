// SPDX-License-Identifier: MPL-2.0
//! ONNX colorization adapter implementing the [`ChromaPredictor`] trait.
//!
//! [`ChromaPredictor`]: crate::application::port::ChromaPredictor

use ndarray::Array4;

use crate::application::port::{ChromaPredictor, PredictError, PredictorCapabilities};
use crate::media::model::{ColorizationModel, LoadResult, ModelArtifacts};

/// ONNX-based chrominance predictor.
///
/// This adapter wraps [`ColorizationModel`] and finishes its raw output:
/// a two-channel output is already ab; an output with one channel per
/// cluster center goes through the model's cluster head.
///
/// # Thread Safety
///
/// This type is `Send + Sync`; the model serializes access to its session.
///
/// # Example
///
/// ```ignore
/// use chroma_lens::infrastructure::onnx::OnnxColorizer;
/// use chroma_lens::media::colorize::colorize;
///
/// let model = OnnxColorizer::load(&config.model.artifacts())?;
/// let colorized = colorize(&model, &image)?;
/// ```
#[derive(Debug)]
pub struct OnnxColorizer {
    model: ColorizationModel,
}

impl OnnxColorizer {
    /// Loads the model from its artifacts.
    ///
    /// # Errors
    ///
    /// Returns an error if any artifact is missing or invalid.
    pub fn load(artifacts: &ModelArtifacts) -> LoadResult<Self> {
        ColorizationModel::load(artifacts).map(Self::from_model)
    }

    /// Creates a predictor from an already loaded model.
    #[must_use]
    pub fn from_model(model: ColorizationModel) -> Self {
        Self { model }
    }

    /// Returns a reference to the underlying model.
    #[must_use]
    pub fn model(&self) -> &ColorizationModel {
        &self.model
    }
}

impl ChromaPredictor for OnnxColorizer {
    fn predict(&self, lightness: &Array4<f32>) -> Result<Array4<f32>, PredictError> {
        let raw = self.model.forward(lightness)?;
        finish_output(raw, self.model.head().classes(), |logits| {
            self.model.head().decode(logits)
        })
    }

    fn capabilities(&self) -> PredictorCapabilities {
        PredictorCapabilities::new("Colorization (ONNX)")
    }
}

/// Passes ab output through, decodes class logits, rejects anything else.
fn finish_output(
    raw: Array4<f32>,
    classes: usize,
    decode: impl FnOnce(&Array4<f32>) -> Result<Array4<f32>, PredictError>,
) -> Result<Array4<f32>, PredictError> {
    match raw.shape()[1] {
        2 => Ok(raw),
        c if c == classes => decode(&raw),
        c => Err(PredictError::UnexpectedOutput(format!(
            "expected 2 or {classes} output channels, got {c}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::cluster_head::ClusterHead;
    use ndarray::Array2;

    fn head() -> ClusterHead {
        let points = Array2::from_shape_vec((3, 2), vec![10.0, 0.0, 20.0, 0.0, 30.0, 0.0])
            .expect("valid shape");
        ClusterHead::new(points, 1.0)
    }

    #[test]
    fn two_channel_output_passes_through() {
        let raw = Array4::<f32>::from_elem((1, 2, 4, 4), 7.0);
        let head = head();
        let out = finish_output(raw.clone(), head.classes(), |l| head.decode(l))
            .expect("should pass through");
        assert_eq!(out, raw);
    }

    #[test]
    fn class_logits_are_decoded() {
        let raw = Array4::<f32>::zeros((1, 3, 4, 4));
        let head = head();
        let out = finish_output(raw, head.classes(), |l| head.decode(l)).expect("should decode");
        assert_eq!(out.shape(), &[1, 2, 4, 4]);
        assert!((out[[0, 0, 0, 0]] - 20.0).abs() < 1e-4);
    }

    #[test]
    fn other_channel_counts_are_rejected() {
        let raw = Array4::<f32>::zeros((1, 5, 4, 4));
        let head = head();
        let result = finish_output(raw, head.classes(), |l| head.decode(l));
        assert!(matches!(result, Err(PredictError::UnexpectedOutput(_))));
    }
}
