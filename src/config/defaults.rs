// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the application. Constants are organized by category.
//!
//! # Categories
//!
//! - **Model**: Artifact locations and the constants the network was trained with
//! - **Folders**: Batch and evaluation directories
//! - **Server**: Upload endpoint settings
//! - **Metrics**: PSNR/SSIM parameters

// ==========================================================================
// Model Defaults
// ==========================================================================

/// Default path of the network topology.
pub const DEFAULT_TOPOLOGY_PATH: &str = "./model/colorization_release_v2.onnx";

/// Default path of the network weights.
///
/// Same as the topology for a self-contained ONNX file.
pub const DEFAULT_WEIGHTS_PATH: &str = "./model/colorization_release_v2.onnx";

/// Default path of the quantized ab cluster centers.
pub const DEFAULT_POINTS_PATH: &str = "./model/pts_in_hull.npy";

/// Spatial size (width and height) of the network input.
pub const NETWORK_INPUT_SIZE: u32 = 224;

/// Lightness bias subtracted before inference. Must match training.
pub const LIGHTNESS_BIAS: f32 = 50.0;

/// Scale applied to the class logits before the softmax (`conv8_313_rh`).
pub const REBALANCE_FACTOR: f32 = 2.606;

// ==========================================================================
// Folder Defaults
// ==========================================================================

/// Folder holding the grayscale inputs of a batch run.
pub const DEFAULT_GRAY_DIR: &str = "./gray";

/// Folder holding the ground-truth color images.
pub const DEFAULT_COLOR_DIR: &str = "./color_256";

/// Folder the batch run writes colorized images to.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

// ==========================================================================
// Server Defaults
// ==========================================================================

/// Default listen address of the upload endpoint.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Folder uploads and their colorized results are written to.
pub const DEFAULT_UPLOAD_DIR: &str = "static/uploads";

/// Largest accepted request body (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Smallest request body limit accepted from the config file.
pub const MIN_MAX_UPLOAD_BYTES: usize = 64 * 1024;

// ==========================================================================
// Metric Defaults
// ==========================================================================

/// PSNR reported for identical images, in place of infinity.
pub const PSNR_IDENTICAL: f64 = 100.0;

/// Default SSIM window side.
pub const DEFAULT_SSIM_WINDOW: u32 = 7;

/// Smallest image side for which SSIM is computed.
pub const MIN_SSIM_DIMENSION: u32 = 7;

/// Largest SSIM window side accepted from the config file.
pub const MAX_SSIM_WINDOW: u32 = 255;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(NETWORK_INPUT_SIZE > 0);
    assert!(LIGHTNESS_BIAS > 0.0);
    assert!(REBALANCE_FACTOR > 0.0);

    assert!(MIN_MAX_UPLOAD_BYTES > 0);
    assert!(DEFAULT_MAX_UPLOAD_BYTES >= MIN_MAX_UPLOAD_BYTES);

    assert!(PSNR_IDENTICAL > 0.0);
    assert!(DEFAULT_SSIM_WINDOW % 2 == 1);
    assert!(DEFAULT_SSIM_WINDOW >= MIN_SSIM_DIMENSION);
    assert!(MAX_SSIM_WINDOW >= DEFAULT_SSIM_WINDOW);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_defaults_match_training() {
        assert_eq!(NETWORK_INPUT_SIZE, 224);
        assert_eq!(LIGHTNESS_BIAS, 50.0);
        assert!((REBALANCE_FACTOR - 2.606).abs() < f32::EPSILON);
    }

    #[test]
    fn ssim_defaults_are_valid() {
        assert_eq!(DEFAULT_SSIM_WINDOW, 7);
        assert_eq!(DEFAULT_SSIM_WINDOW % 2, 1);
        assert!(DEFAULT_SSIM_WINDOW <= MAX_SSIM_WINDOW);
    }

    #[test]
    fn folder_defaults_are_distinct() {
        assert_ne!(DEFAULT_GRAY_DIR, DEFAULT_COLOR_DIR);
        assert_ne!(DEFAULT_COLOR_DIR, DEFAULT_OUTPUT_DIR);
    }
}
