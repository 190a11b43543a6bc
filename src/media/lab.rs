// SPDX-License-Identifier: MPL-2.0
//! CIE Lab planes and plane resampling.
//!
//! Lab values follow the usual float convention: L in 0..=100, a and b
//! roughly in -128..=127, D65 white point, sRGB transfer curve on the RGB
//! side.

use image_rs::imageops::{self, FilterType};
use image_rs::{ImageBuffer, Luma, Rgb, RgbImage};
use ndarray::Array2;
use palette::{FromColor, IntoColor, Lab, LinSrgb, Srgb};

/// An image split into its L, a and b planes, indexed `[row, column]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabPlanes {
    pub l: Array2<f32>,
    pub a: Array2<f32>,
    pub b: Array2<f32>,
}

impl LabPlanes {
    /// Converts an 8-bit RGB raster, scaling samples to [0, 1] first.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let shape = (height as usize, width as usize);
        let mut l = Array2::<f32>::zeros(shape);
        let mut a = Array2::<f32>::zeros(shape);
        let mut b = Array2::<f32>::zeros(shape);

        for (x, y, pixel) in image.enumerate_pixels() {
            let [r, g, bl] = pixel.0;
            let srgb = Srgb::new(
                f32::from(r) / 255.0,
                f32::from(g) / 255.0,
                f32::from(bl) / 255.0,
            );
            let lin: LinSrgb<f32> = srgb.into_linear();
            let lab: Lab = Lab::from_color(lin);
            let idx = (y as usize, x as usize);
            l[idx] = lab.l;
            a[idx] = lab.a;
            b[idx] = lab.b;
        }

        Self { l, a, b }
    }

    /// Plane dimensions as (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        let (rows, cols) = self.l.dim();
        (cols as u32, rows as u32)
    }

    /// Converts back to 8-bit RGB, clipping out-of-gamut values to [0, 1].
    pub fn to_rgb8(&self) -> RgbImage {
        let (width, height) = self.dimensions();
        let mut image = RgbImage::new(width, height);

        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let idx = (y as usize, x as usize);
            let lab = Lab::new(self.l[idx], self.a[idx], self.b[idx]);
            let lin: LinSrgb<f32> = lab.into_color();
            let srgb: Srgb<f32> = Srgb::from_linear(lin);
            *pixel = Rgb([
                to_u8(srgb.red),
                to_u8(srgb.green),
                to_u8(srgb.blue),
            ]);
        }

        image
    }
}

/// Float sample to 8 bits: clip to [0, 1], scale by 255, truncate.
#[inline]
fn to_u8(value: f32) -> u8 {
    // NaN clamps to 0 through the cast
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

type PlaneImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Resizes a plane to `width x height` with `image`'s triangle (bilinear)
/// filter.
///
/// `imageops` clamps float samples to [0, 1], so the plane is mapped onto
/// that range for the resample and mapped back afterwards.
pub fn resize_plane(plane: &Array2<f32>, width: usize, height: usize) -> Array2<f32> {
    let (rows, cols) = plane.dim();
    if rows == 0 || cols == 0 || width == 0 || height == 0 {
        return Array2::zeros((height, width));
    }
    if (rows, cols) == (height, width) {
        return plane.clone();
    }

    let (low, high) = plane
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = high - low;
    if span <= 0.0 || !span.is_finite() {
        return Array2::from_elem((height, width), low);
    }

    let samples: Vec<f32> = plane.iter().map(|v| (v - low) / span).collect();
    let Some(source) = PlaneImage::from_raw(cols as u32, rows as u32, samples) else {
        return Array2::zeros((height, width));
    };
    let resized = imageops::resize(&source, width as u32, height as u32, FilterType::Triangle);
    let values: Vec<f32> = resized.into_raw().into_iter().map(|v| v * span + low).collect();

    Array2::from_shape_vec((height, width), values)
        .unwrap_or_else(|_| Array2::zeros((height, width)))
}
