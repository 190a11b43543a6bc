// SPDX-License-Identifier: MPL-2.0
//! Decoding of class logits into ab chrominance.
//!
//! The network body predicts, per pixel, a distribution over `N` quantized
//! ab bins. Three fixed layers turn it into a continuous ab pair:
//!
//! | layer | kind | parameters |
//! |-------|------|------------|
//! | `conv8_313_rh` | Scale | rebalancing factor (2.606) |
//! | `class8_313_rh` | Softmax | none |
//! | `class8_ab` | 1x1 Convolution | cluster centers `(N, 2)` |
//!
//! [`ClusterHead`] is that tail, evaluated on the host.

use crate::application::port::PredictError;
use ndarray::{Array2, Array4, Axis};

/// Name, kind and parameter-blob count of the head layers, in order.
pub const HEAD_LAYERS: [(&str, &str, usize); 3] = [
    ("conv8_313_rh", "Scale", 1),
    ("class8_313_rh", "Softmax", 0),
    ("class8_ab", "Convolution", 1),
];

/// Cluster centers plus the logit rebalancing factor.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterHead {
    points: Array2<f32>,
    rebalance: f32,
}

impl ClusterHead {
    /// `points` must be shaped `(N, 2)`; the loader checks this.
    pub fn new(points: Array2<f32>, rebalance: f32) -> Self {
        debug_assert_eq!(points.ncols(), 2);
        Self { points, rebalance }
    }

    /// Number of ab bins.
    pub fn classes(&self) -> usize {
        self.points.nrows()
    }

    /// Decodes `[1, N, h, w]` logits into `[1, 2, h, w]` ab values.
    pub fn decode(&self, logits: &Array4<f32>) -> Result<Array4<f32>, PredictError> {
        let (batch, classes, height, width) = logits.dim();
        if batch != 1 || classes != self.classes() {
            return Err(PredictError::UnexpectedOutput(format!(
                "expected [1, {}, h, w] logits, got {:?}",
                self.classes(),
                logits.shape()
            )));
        }

        let mut ab = Array4::<f32>::zeros((1, 2, height, width));
        let mut probs = vec![0.0_f32; classes];
        let sample = logits.index_axis(Axis(0), 0);

        for y in 0..height {
            for x in 0..width {
                let column = sample.slice(ndarray::s![.., y, x]);

                // Softmax of the rebalanced logits, shifted by the max for stability.
                let max = column
                    .iter()
                    .fold(f32::NEG_INFINITY, |m, &v| m.max(v * self.rebalance));
                let mut sum = 0.0_f32;
                for (p, &v) in probs.iter_mut().zip(column.iter()) {
                    *p = (v * self.rebalance - max).exp();
                    sum += *p;
                }

                let (mut a, mut b) = (0.0_f32, 0.0_f32);
                for (k, p) in probs.iter().enumerate() {
                    let weight = p / sum;
                    a += weight * self.points[[k, 0]];
                    b += weight * self.points[[k, 1]];
                }
                ab[[0, 0, y, x]] = a;
                ab[[0, 1, y, x]] = b;
            }
        }

        Ok(ab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_abs_diff_eq, F32_EPSILON};

    fn three_bins() -> ClusterHead {
        let points = Array2::from_shape_vec((3, 2), vec![-90.0, 50.0, 0.0, 0.0, 60.0, -30.0])
            .expect("valid shape");
        ClusterHead::new(points, 2.606)
    }

    #[test]
    fn uniform_logits_decode_to_mean_center() {
        let head = three_bins();
        let logits = Array4::<f32>::zeros((1, 3, 2, 2));
        let ab = head.decode(&logits).expect("decode should succeed");

        assert_eq!(ab.shape(), &[1, 2, 2, 2]);
        assert_abs_diff_eq!(ab[[0, 0, 1, 1]], -10.0, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(ab[[0, 1, 1, 1]], 20.0 / 3.0, epsilon = F32_EPSILON);
    }

    #[test]
    fn dominant_logit_decodes_to_its_center() {
        let head = three_bins();
        let mut logits = Array4::<f32>::zeros((1, 3, 1, 1));
        logits[[0, 2, 0, 0]] = 40.0;
        let ab = head.decode(&logits).expect("decode should succeed");

        assert_abs_diff_eq!(ab[[0, 0, 0, 0]], 60.0, epsilon = 1e-3);
        assert_abs_diff_eq!(ab[[0, 1, 0, 0]], -30.0, epsilon = 1e-3);
    }

    #[test]
    fn rebalance_sharpens_the_distribution() {
        let points = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 100.0, 0.0])
            .expect("valid shape");
        let mut logits = Array4::<f32>::zeros((1, 2, 1, 1));
        logits[[0, 1, 0, 0]] = 1.0;

        let flat = ClusterHead::new(points.clone(), 1.0)
            .decode(&logits)
            .expect("decode");
        let sharp = ClusterHead::new(points, 2.606)
            .decode(&logits)
            .expect("decode");
        assert!(sharp[[0, 0, 0, 0]] > flat[[0, 0, 0, 0]]);
    }

    #[test]
    fn large_logits_do_not_overflow() {
        let head = three_bins();
        let logits = Array4::<f32>::from_elem((1, 3, 1, 1), 1.0e4);
        let ab = head.decode(&logits).expect("decode should succeed");
        assert!(ab.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn class_count_mismatch_is_rejected() {
        let head = three_bins();
        let logits = Array4::<f32>::zeros((1, 313, 1, 1));
        assert!(matches!(
            head.decode(&logits),
            Err(PredictError::UnexpectedOutput(_))
        ));
    }

    #[test]
    fn head_layers_are_listed_in_forward_order() {
        let names: Vec<_> = HEAD_LAYERS.iter().map(|(name, _, _)| *name).collect();
        assert_eq!(names, ["conv8_313_rh", "class8_313_rh", "class8_ab"]);
    }
}
