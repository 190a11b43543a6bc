// SPDX-License-Identifier: MPL-2.0
//! `chroma_lens` colorizes grayscale photographs with a pretrained network
//! and measures how close the results come to ground truth.
//!
//! It provides the colorization pipeline, PSNR/SSIM evaluation over folders,
//! an HTTP upload server and a few inspection tools (layer summary, pipeline
//! diagram).

#![doc(html_root_url = "https://docs.rs/chroma_lens/0.1.0")]

pub mod application;
pub mod config;
pub mod diagram;
pub mod directory_scanner;
pub mod error;
pub mod evaluation;
pub mod infrastructure;
pub mod media;
pub mod summary;
pub mod web;

#[cfg(test)]
pub mod test_utils;
