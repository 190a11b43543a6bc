// SPDX-License-Identifier: MPL-2.0
use chroma_lens::application::port::{ChromaPredictor, PredictError, PredictorCapabilities};
use chroma_lens::evaluation::metrics;
use chroma_lens::media::colorize::colorize;
use criterion::{criterion_group, criterion_main, Criterion};
use image_rs::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use ndarray::Array4;
use std::hint::black_box;

/// Stands in for the network so only the host-side pipeline is measured.
struct ZeroChroma;

impl ChromaPredictor for ZeroChroma {
    fn predict(&self, _lightness: &Array4<f32>) -> Result<Array4<f32>, PredictError> {
        Ok(Array4::zeros((1, 2, 56, 56)))
    }

    fn capabilities(&self) -> PredictorCapabilities {
        PredictorCapabilities::new("Zero")
    }
}

fn pattern(width: u32, height: u32, shift: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x + shift) % 256) as u8,
            ((y * 3) % 256) as u8,
            ((x ^ y) % 256) as u8,
        ])
    })
}

fn metrics_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");
    let reference = pattern(256, 256, 0);
    let candidate = pattern(256, 256, 3);

    group.bench_function("psnr_256", |b| {
        b.iter(|| black_box(metrics::psnr(&reference, &candidate)));
    });
    group.bench_function("ssim_256_window7", |b| {
        b.iter(|| black_box(metrics::ssim(&reference, &candidate, 7)));
    });

    group.finish();
}

fn pipeline_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let gray = DynamicImage::ImageLuma8(GrayImage::from_fn(256, 256, |x, y| {
        Luma([((x + y) % 256) as u8])
    }));

    group.bench_function("colorize_256_gray", |b| {
        b.iter(|| black_box(colorize(&ZeroChroma, &gray)));
    });

    group.finish();
}

criterion_group!(benches, metrics_benchmark, pipeline_benchmark);
criterion_main!(benches);
