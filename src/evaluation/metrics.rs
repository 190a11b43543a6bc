// SPDX-License-Identifier: MPL-2.0
//! PSNR and SSIM between a reference and a candidate raster.

use super::EvaluationError;
use crate::config::defaults::{MIN_SSIM_DIMENSION, PSNR_IDENTICAL};
use image_rs::RgbImage;

/// Dynamic range of 8-bit samples.
const DATA_RANGE: f64 = 255.0;
const K1: f64 = 0.01;
const K2: f64 = 0.03;

fn ensure_same_size(reference: &RgbImage, candidate: &RgbImage) -> Result<(), EvaluationError> {
    if reference.dimensions() != candidate.dimensions() {
        return Err(EvaluationError::DimensionMismatch {
            reference: reference.dimensions(),
            candidate: candidate.dimensions(),
        });
    }
    Ok(())
}

/// Peak signal-to-noise ratio in dB over all samples of all channels.
///
/// Identical images give [`PSNR_IDENTICAL`] rather than infinity so that
/// averages stay finite.
pub fn psnr(reference: &RgbImage, candidate: &RgbImage) -> Result<f64, EvaluationError> {
    ensure_same_size(reference, candidate)?;

    let samples = reference.as_raw().len();
    if samples == 0 {
        return Ok(PSNR_IDENTICAL);
    }

    let squared: f64 = reference
        .as_raw()
        .iter()
        .zip(candidate.as_raw())
        .map(|(&r, &c)| {
            let d = f64::from(r) - f64::from(c);
            d * d
        })
        .sum();
    let mse = squared / samples as f64;

    if mse == 0.0 {
        return Ok(PSNR_IDENTICAL);
    }
    Ok(20.0 * (DATA_RANGE / mse.sqrt()).log10())
}

/// SSIM window actually used for a `width x height` image.
///
/// An even request is rounded down to odd, then shrunk to the largest odd
/// size that fits the smaller side. `None` when the request is below 3 or
/// that side is below [`MIN_SSIM_DIMENSION`].
pub fn effective_window(width: u32, height: u32, window: u32) -> Option<u32> {
    let window = if window % 2 == 0 {
        window.saturating_sub(1)
    } else {
        window
    };
    let side = width.min(height);
    if window < 3 || side < MIN_SSIM_DIMENSION {
        return None;
    }
    let largest_odd = if side % 2 == 0 { side - 1 } else { side };
    Some(window.min(largest_odd))
}

/// Mean structural similarity, averaged over the three channels.
///
/// Uses a uniform `window x window` filter with sample covariance and the
/// standard constants (K1 = 0.01, K2 = 0.03, range 255). Only window
/// positions fully inside the image are averaged. Returns `Ok(None)` when the
/// image is too small for a window (see [`effective_window`]).
pub fn ssim(
    reference: &RgbImage,
    candidate: &RgbImage,
    window: u32,
) -> Result<Option<f64>, EvaluationError> {
    ensure_same_size(reference, candidate)?;

    let (width, height) = reference.dimensions();
    let Some(window) = effective_window(width, height, window) else {
        return Ok(None);
    };

    let (w, h, win) = (width as usize, height as usize, window as usize);
    let total: f64 = (0..3)
        .map(|c| {
            let x = channel(reference, c);
            let y = channel(candidate, c);
            channel_ssim(&x, &y, w, h, win)
        })
        .sum();

    Ok(Some(total / 3.0))
}

fn channel(image: &RgbImage, c: usize) -> Vec<f64> {
    image.pixels().map(|p| f64::from(p[c])).collect()
}

/// Summed-area table with one row and column of zero padding.
struct Integral {
    stride: usize,
    table: Vec<f64>,
}

impl Integral {
    fn new(mut values: impl Iterator<Item = f64>, w: usize, h: usize) -> Self {
        let stride = w + 1;
        let mut table = vec![0.0; stride * (h + 1)];
        for y in 0..h {
            let mut row = 0.0;
            for x in 0..w {
                row += values.next().unwrap_or(0.0);
                table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row;
            }
        }
        Self { stride, table }
    }

    /// Sum over the `size x size` block whose top-left corner is (x, y).
    fn block(&self, x: usize, y: usize, size: usize) -> f64 {
        let s = self.stride;
        self.table[(y + size) * s + x + size] - self.table[y * s + x + size]
            - self.table[(y + size) * s + x]
            + self.table[y * s + x]
    }
}

fn channel_ssim(x: &[f64], y: &[f64], w: usize, h: usize, win: usize) -> f64 {
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);
    let np = (win * win) as f64;
    let cov_norm = np / (np - 1.0);

    let sx = Integral::new(x.iter().copied(), w, h);
    let sy = Integral::new(y.iter().copied(), w, h);
    let sxx = Integral::new(x.iter().map(|v| v * v), w, h);
    let syy = Integral::new(y.iter().map(|v| v * v), w, h);
    let sxy = Integral::new(x.iter().zip(y).map(|(a, b)| a * b), w, h);

    let mut sum = 0.0;
    let mut count = 0usize;
    for top in 0..=(h - win) {
        for left in 0..=(w - win) {
            let ux = sx.block(left, top, win) / np;
            let uy = sy.block(left, top, win) / np;
            let uxx = sxx.block(left, top, win) / np;
            let uyy = syy.block(left, top, win) / np;
            let uxy = sxy.block(left, top, win) / np;

            let vx = cov_norm * (uxx - ux * ux);
            let vy = cov_norm * (uyy - uy * uy);
            let vxy = cov_norm * (uxy - ux * uy);

            let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
            let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            sum += numerator / denominator;
            count += 1;
        }
    }

    sum / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;
    use image_rs::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) * 3 % 256) as u8])
        })
    }

    #[test]
    fn psnr_of_identical_images_is_the_sentinel() {
        let img = gradient(32, 32);
        assert_eq!(psnr(&img, &img).expect("same size"), PSNR_IDENTICAL);
    }

    #[test]
    fn psnr_matches_closed_form() {
        let a = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        let b = RgbImage::from_pixel(4, 4, Rgb([110, 110, 110]));
        // mse = 100 -> 20 * log10(255 / 10)
        assert_abs_diff_eq!(
            psnr(&a, &b).expect("same size"),
            20.0 * 25.5_f64.log10(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn psnr_is_symmetric_and_finite() {
        let a = gradient(16, 8);
        let b = RgbImage::from_pixel(16, 8, Rgb([0, 255, 0]));
        let ab = psnr(&a, &b).expect("same size");
        let ba = psnr(&b, &a).expect("same size");
        assert_abs_diff_eq!(ab, ba, epsilon = 1e-12);
        assert!(ab.is_finite() && ab < PSNR_IDENTICAL);
    }

    #[test]
    fn size_mismatch_is_reported() {
        let a = gradient(8, 8);
        let b = gradient(8, 9);
        assert!(matches!(
            psnr(&a, &b),
            Err(EvaluationError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            ssim(&a, &b, 7),
            Err(EvaluationError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn ssim_of_identical_images_is_one() {
        let img = gradient(20, 12);
        let score = ssim(&img, &img, 7).expect("same size").expect("large enough");
        assert_abs_diff_eq!(score, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn ssim_is_skipped_below_seven_pixels() {
        let img = gradient(6, 40);
        assert_eq!(ssim(&img, &img, 7).expect("same size"), None);

        let img = gradient(7, 7);
        assert!(ssim(&img, &img, 7).expect("same size").is_some());
    }

    #[test]
    fn ssim_drops_for_distorted_images() {
        let a = gradient(24, 24);
        let b = RgbImage::from_fn(24, 24, |x, y| {
            let p = a.get_pixel(x, y);
            let noise = if (x + y) % 2 == 0 { 40 } else { 0 };
            Rgb([p[0].saturating_add(noise), p[1], p[2].saturating_sub(noise)])
        });
        let score = ssim(&a, &b, 7).expect("same size").expect("large enough");
        assert!(score < 0.99);
        assert!(score > -1.0);
    }

    #[test]
    fn window_shrinks_to_largest_odd_side() {
        assert_eq!(effective_window(256, 256, 7), Some(7));
        assert_eq!(effective_window(8, 100, 11), Some(7));
        assert_eq!(effective_window(9, 9, 255), Some(9));
        assert_eq!(effective_window(5, 500, 7), None);
    }

    #[test]
    fn degenerate_windows_are_normalized() {
        assert_eq!(effective_window(64, 64, 8), Some(7));
        assert_eq!(effective_window(64, 64, 4), Some(3));
        assert_eq!(effective_window(64, 64, 3), Some(3));
        assert_eq!(effective_window(64, 64, 2), None);
        assert_eq!(effective_window(64, 64, 1), None);
        assert_eq!(effective_window(64, 64, 0), None);
    }

    #[test]
    fn tiny_windows_never_produce_nan() {
        let img = gradient(20, 12);
        for window in [0, 1, 2] {
            assert_eq!(ssim(&img, &img, window).expect("same size"), None);
        }
        let score = ssim(&img, &img, 8).expect("same size").expect("large enough");
        assert!(score.is_finite());
    }

    #[test]
    fn integral_blocks_sum_correctly() {
        let values: Vec<f64> = (1..=9).map(f64::from).collect();
        let table = Integral::new(values.into_iter(), 3, 3);
        assert_eq!(table.block(0, 0, 3), 45.0);
        assert_eq!(table.block(1, 1, 2), 5.0 + 6.0 + 8.0 + 9.0);
    }
}
