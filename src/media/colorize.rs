// SPDX-License-Identifier: MPL-2.0
//! The colorization pipeline.
//!
//! ```text
//! RGB/gray ──► Lab (full res) ──► L resized to input ──► L - 50 ──► predictor
//!                   │                                                   │
//!                   └── L (full res) ──► recombine ◄── ab upsampled ◄───┘
//!                                            │
//!                                            ▼
//!                                   sRGB, clipped, 8-bit
//! ```
//!
//! Only chrominance is produced at the network's resolution. The lightness of
//! the result is always the original-resolution L plane.

use crate::application::port::{ChromaPredictor, PredictError};
use crate::config::defaults::LIGHTNESS_BIAS;
use crate::media::lab::{resize_plane, LabPlanes};
use image_rs::{DynamicImage, RgbImage};
use ndarray::{s, Array2, Array4};
use thiserror::Error;

/// Errors that can occur while colorizing one image.
#[derive(Debug, Clone, Error)]
pub enum ColorizeError {
    /// The input has no pixels.
    #[error("image has no pixels")]
    EmptyImage,

    /// The forward pass failed.
    #[error(transparent)]
    Predict(#[from] PredictError),

    /// The predictor returned something other than `[1, 2, h, w]`.
    #[error("expected chrominance shaped [1, 2, h, w], got {0:?}")]
    OutputShape(Vec<usize>),
}

/// Colorizes one decoded raster.
///
/// Accepts any resolution and any channel layout `image` can represent;
/// returns an 8-bit RGB raster with the same width and height.
pub fn colorize(
    model: &dyn ChromaPredictor,
    image: &DynamicImage,
) -> Result<RgbImage, ColorizeError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(ColorizeError::EmptyImage);
    }

    let lab = preprocess(image);
    let input = network_input(&lab.l, model.capabilities().input_size);
    let chroma = model.predict(&input)?;
    Ok(postprocess(lab.l, &chroma)?.to_rgb8())
}

/// Forces three channels and converts to Lab at full resolution.
pub fn preprocess(image: &DynamicImage) -> LabPlanes {
    // Gray inputs are replicated into R, G and B.
    let rgb = image.to_rgb8();
    LabPlanes::from_rgb(&rgb)
}

/// Resizes the lightness plane to the network input and removes the bias.
pub fn network_input(lightness: &Array2<f32>, (width, height): (u32, u32)) -> Array4<f32> {
    let resized = resize_plane(lightness, width as usize, height as usize);
    let centered = resized.mapv(|l| l - LIGHTNESS_BIAS);
    centered.insert_axis(ndarray::Axis(0)).insert_axis(ndarray::Axis(0))
}

/// Upsamples chrominance to the lightness plane's size and recombines.
pub fn postprocess(lightness: Array2<f32>, chroma: &Array4<f32>) -> Result<LabPlanes, ColorizeError> {
    let shape = chroma.shape();
    if shape.len() != 4 || shape[0] != 1 || shape[1] != 2 || shape[2] == 0 || shape[3] == 0 {
        return Err(ColorizeError::OutputShape(shape.to_vec()));
    }

    let (rows, cols) = lightness.dim();
    let a = resize_plane(&chroma.slice(s![0, 0, .., ..]).to_owned(), cols, rows);
    let b = resize_plane(&chroma.slice(s![0, 1, .., ..]).to_owned(), cols, rows);

    Ok(LabPlanes { l: lightness, a, b })
}
