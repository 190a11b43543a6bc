// SPDX-License-Identifier: MPL-2.0
//! Image-fidelity evaluation of colorized outputs.
//!
//! - [`metrics`]: PSNR and SSIM for one pair of rasters
//! - [`corpus`]: directory pairing, the batch colorize-and-score driver and
//!   the metric-only corpus comparator
//!
//! Results of a directory pass are collected in a [`MetricAccumulator`].

pub mod corpus;
pub mod metrics;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use corpus::{evaluate_corpus, run_batch, BatchReport, CorpusReport};
pub use metrics::{effective_window, psnr, ssim};

/// Errors raised while scoring images or pairing directories.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    /// The two folders hold a different number of images.
    #[error("the number of reference images ({reference}) and candidate images ({candidate}) must be the same")]
    CountMismatch { reference: usize, candidate: usize },

    /// The two rasters of a pair differ in size.
    #[error("image sizes differ: reference {reference:?}, candidate {candidate:?}")]
    DimensionMismatch {
        reference: (u32, u32),
        candidate: (u32, u32),
    },

    /// An input has no counterpart in the other folder.
    #[error("no counterpart found for {name}")]
    MissingPair { name: String },
}

/// How directory pairs are formed and what a pairing miss does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingPolicy {
    /// Any pairing miss aborts the run before or at the offending file.
    #[default]
    Strict,
    /// Pairs by identical file name; misses are logged and skipped.
    Lenient,
}

impl fmt::Display for PairingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairingPolicy::Strict => write!(f, "strict"),
            PairingPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

/// Averages of one directory pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    /// Number of scored pairs (all of them have a PSNR).
    pub images: usize,
    pub average_psnr: f64,
    /// Mean over the pairs SSIM could be computed for.
    pub average_ssim: Option<f64>,
    pub ssim_scored: usize,
    pub ssim_skipped: usize,
}

impl fmt::Display for MetricSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average PSNR: {:.2}", self.average_psnr)?;
        match self.average_ssim {
            Some(ssim) => write!(f, "Average SSIM: {ssim:.4}")?,
            None => write!(f, "Average SSIM: n/a")?,
        }
        if self.ssim_skipped > 0 {
            write!(
                f,
                " (skipped for {} of {} images)",
                self.ssim_skipped, self.images
            )?;
        }
        Ok(())
    }
}

/// Running sums of one directory pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricAccumulator {
    psnr_sum: f64,
    images: usize,
    ssim_sum: f64,
    ssim_scored: usize,
    ssim_skipped: usize,
}

impl MetricAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one scored pair. `ssim` is `None` when it was skipped.
    pub fn record(&mut self, psnr: f64, ssim: Option<f64>) {
        self.psnr_sum += psnr;
        self.images += 1;
        match ssim {
            Some(value) => {
                self.ssim_sum += value;
                self.ssim_scored += 1;
            }
            None => self.ssim_skipped += 1,
        }
    }

    pub fn images(&self) -> usize {
        self.images
    }

    /// Averages, or `None` if nothing was recorded.
    pub fn summary(&self) -> Option<MetricSummary> {
        if self.images == 0 {
            return None;
        }
        let average_ssim = (self.ssim_scored > 0).then(|| self.ssim_sum / self.ssim_scored as f64);
        Some(MetricSummary {
            images: self.images,
            average_psnr: self.psnr_sum / self.images as f64,
            average_ssim,
            ssim_scored: self.ssim_scored,
            ssim_skipped: self.ssim_skipped,
        })
    }
}
