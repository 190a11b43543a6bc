// SPDX-License-Identifier: MPL-2.0
//! Directory-level drivers.
//!
//! [`run_batch`] colorizes a folder of grayscale images, writes the results
//! and scores them against color references. [`evaluate_corpus`] only scores
//! two existing folders against each other.

use super::{metrics, EvaluationError, MetricAccumulator, MetricSummary, PairingPolicy};
use crate::application::port::ChromaPredictor;
use crate::config::{BatchConfig, EvaluateConfig};
use crate::directory_scanner::ImageList;
use crate::error::Result;
use crate::media::{self, colorize::colorize};
use image_rs::RgbImage;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of a batch colorize-and-score run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Grayscale images that were colorized, written and scored.
    pub processed: usize,
    /// Grayscale images skipped for lack of a color counterpart.
    pub missing: Vec<String>,
    pub summary: Option<MetricSummary>,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.summary {
            Some(summary) => write!(f, "{summary}")?,
            None => write!(f, "No images processed.")?,
        }
        if !self.missing.is_empty() {
            write!(
                f,
                "\nSkipped {} image(s) without a color counterpart",
                self.missing.len()
            )?;
        }
        Ok(())
    }
}

/// Outcome of a metric-only corpus comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusReport {
    pub compared: usize,
    /// Reference images without a candidate (lenient pairing only).
    pub missing: Vec<String>,
    pub summary: Option<MetricSummary>,
}

impl fmt::Display for CorpusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.summary {
            Some(summary) => write!(f, "{summary}"),
            None => write!(f, "No images compared."),
        }
    }
}

/// One reference/candidate pair of a corpus comparison.
#[derive(Debug, Clone, PartialEq)]
struct ImagePair {
    name: String,
    reference: PathBuf,
    candidate: PathBuf,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Scores one pair and records it. SSIM skips are logged, not fatal.
fn score_into(
    accumulator: &mut MetricAccumulator,
    name: &str,
    reference: &RgbImage,
    candidate: &RgbImage,
    window: u32,
) -> std::result::Result<(), EvaluationError> {
    let psnr = metrics::psnr(reference, candidate)?;
    let ssim = metrics::ssim(reference, candidate, window)?;
    if ssim.is_none() {
        let (w, h) = reference.dimensions();
        warn!("Skipping SSIM calculation for {name} due to small image size ({w}x{h})");
    }
    debug!(image = name, psnr, ssim = ?ssim, "scored");
    accumulator.record(psnr, ssim);
    Ok(())
}

/// Decodes a color reference. A file that is absent or does not decode
/// counts as no reference.
fn load_reference(path: &Path) -> Option<RgbImage> {
    if !path.is_file() {
        return None;
    }
    match media::load_image(path) {
        Ok(image) => Some(image.to_rgb8()),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "color reference does not decode");
            None
        }
    }
}

/// Colorizes every grayscale image of `config.gray_dir`, writes the result
/// under the same name into `config.output_dir` and scores it against
/// `config.color_dir/<name>`.
///
/// Under [`PairingPolicy::Lenient`] a gray image without a decodable color
/// counterpart is logged and skipped before colorization. Under
/// [`PairingPolicy::Strict`] it aborts the run with
/// [`EvaluationError::MissingPair`].
pub fn run_batch(
    model: &dyn ChromaPredictor,
    config: &BatchConfig,
    window: u32,
) -> Result<BatchReport> {
    let grays = ImageList::scan_directory(&config.gray_dir)?;
    fs::create_dir_all(&config.output_dir)?;
    info!(
        images = grays.len(),
        gray_dir = %config.gray_dir.display(),
        pairing = %config.pairing,
        "starting batch"
    );

    let mut accumulator = MetricAccumulator::new();
    let mut missing = Vec::new();

    for gray_path in grays.iter() {
        let name = display_name(gray_path);
        let color_path = config.color_dir.join(&name);

        let Some(reference) = load_reference(&color_path) else {
            match config.pairing {
                PairingPolicy::Lenient => {
                    warn!("Color image not found for {name}");
                    missing.push(name);
                    continue;
                }
                PairingPolicy::Strict => {
                    return Err(EvaluationError::MissingPair { name }.into());
                }
            }
        };

        let gray = media::load_grayscale(gray_path)?;
        let colorized = colorize(model, &gray)?;
        media::save_image(&colorized, config.output_dir.join(&name))?;

        score_into(&mut accumulator, &name, &reference, &colorized, window)?;
        info!("Processed {name}");
    }

    Ok(BatchReport {
        processed: accumulator.images(),
        missing,
        summary: accumulator.summary(),
    })
}

/// Builds the comparison pairs of two listings under `policy`.
///
/// Strict pairing checks the counts before anything else is touched.
fn pair_directories(
    references: &ImageList,
    candidates: &ImageList,
    candidate_dir: &Path,
    policy: PairingPolicy,
) -> std::result::Result<(Vec<ImagePair>, Vec<String>), EvaluationError> {
    match policy {
        PairingPolicy::Strict => {
            if references.len() != candidates.len() {
                return Err(EvaluationError::CountMismatch {
                    reference: references.len(),
                    candidate: candidates.len(),
                });
            }
            let pairs = references
                .iter()
                .zip(candidates.iter())
                .map(|(reference, candidate)| {
                    let name = display_name(reference);
                    let other = display_name(candidate);
                    if name != other {
                        warn!("Pairing {name} with differently named {other}");
                    }
                    ImagePair {
                        name,
                        reference: reference.to_path_buf(),
                        candidate: candidate.to_path_buf(),
                    }
                })
                .collect();
            Ok((pairs, Vec::new()))
        }
        PairingPolicy::Lenient => {
            let mut pairs = Vec::new();
            let mut missing = Vec::new();
            for reference in references.iter() {
                let name = display_name(reference);
                let candidate = candidate_dir.join(&name);
                if candidate.is_file() {
                    pairs.push(ImagePair {
                        name,
                        reference: reference.to_path_buf(),
                        candidate,
                    });
                } else {
                    warn!("Colorized image not found for {name}");
                    missing.push(name);
                }
            }
            Ok((pairs, missing))
        }
    }
}

/// Scores the images of `config.candidate_dir` against those of
/// `config.reference_dir`.
pub fn evaluate_corpus(config: &EvaluateConfig, window: u32) -> Result<CorpusReport> {
    let references = ImageList::scan_directory(&config.reference_dir)?;
    let candidates = ImageList::scan_directory(&config.candidate_dir)?;
    let (pairs, missing) =
        pair_directories(&references, &candidates, &config.candidate_dir, config.pairing)?;
    info!(pairs = pairs.len(), pairing = %config.pairing, "evaluating corpus");

    let mut accumulator = MetricAccumulator::new();
    for pair in &pairs {
        let reference = media::load_image(&pair.reference)?.to_rgb8();
        let candidate = media::load_image(&pair.candidate)?.to_rgb8();
        score_into(&mut accumulator, &pair.name, &reference, &candidate, window)?;
    }

    Ok(CorpusReport {
        compared: accumulator.images(),
        missing,
        summary: accumulator.summary(),
    })
}
