// SPDX-License-Identifier: MPL-2.0
//! Image handling for the colorization pipeline.
//!
//! - [`model`]: loading of the pretrained network and its cluster centers
//! - [`cluster_head`]: class logits to ab decoding
//! - [`lab`]: Lab planes and resampling
//! - [`colorize`]: the end-to-end pipeline

pub mod cluster_head;
pub mod colorize;
pub mod lab;
pub mod model;

use crate::error::Result;
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::{DynamicImage, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// File extensions the batch tools consider images.
pub const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "png"];

/// Quality used when writing `.jpg`/`.jpeg` outputs.
pub const JPEG_QUALITY: u8 = 95;

/// Returns `true` if the path has one of [`IMAGE_EXTENSIONS`] (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Decodes an image file as-is.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    Ok(image_rs::open(path)?)
}

/// Decodes an image file and reduces it to one 8-bit intensity channel.
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let image = load_image(path)?;
    Ok(DynamicImage::ImageLuma8(image.to_luma8()))
}

/// Writes an RGB raster; the format follows the file extension.
///
/// JPEG files are encoded at [`JPEG_QUALITY`] rather than the encoder default.
pub fn save_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg" | "jpeg") => {
            let mut writer = BufWriter::new(File::create(path)?);
            JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).encode_image(image)?;
            writer.flush()?;
        }
        _ => image.save(path)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::Rgb;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert!(is_supported_image(&PathBuf::from("a.jpg")));
        assert!(is_supported_image(&PathBuf::from("b.PNG")));
        assert!(!is_supported_image(&PathBuf::from("c.jpeg.txt")));
        assert!(!is_supported_image(&PathBuf::from("noext")));
    }

    #[test]
    fn grayscale_load_has_one_channel() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("color.png");
        save_image(&RgbImage::from_pixel(5, 3, Rgb([200, 10, 10])), &path).expect("save");

        let gray = load_grayscale(&path).expect("load");
        assert_eq!(gray.color(), image_rs::ColorType::L8);
        assert_eq!((gray.width(), gray.height()), (5, 3));
    }

    #[test]
    fn jpeg_outputs_use_high_quality() {
        let dir = tempdir().expect("temp dir");
        let image = RgbImage::from_fn(64, 64, |x, y| {
            Rgb([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8])
        });

        let ours = dir.path().join("ours.JPG");
        save_image(&image, &ours).expect("save");
        let stock = dir.path().join("stock.jpg");
        image.save(&stock).expect("save with encoder default");

        let reloaded = load_image(&ours).expect("reload").to_rgb8();
        let score = crate::evaluation::metrics::psnr(&image, &reloaded).expect("same size");
        assert!(score > 35.0, "PSNR after JPEG round trip was {score}");

        let size = |path: &Path| std::fs::metadata(path).expect("metadata").len();
        assert!(size(&ours) > size(&stock));
    }

    #[test]
    fn loading_garbage_is_an_image_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").expect("write");

        assert!(matches!(load_image(&path), Err(crate::error::Error::Image(_))));
    }
}
