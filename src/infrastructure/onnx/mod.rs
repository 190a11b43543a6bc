// SPDX-License-Identifier: MPL-2.0
//! ONNX Runtime adapters implementing the [`ChromaPredictor`] port trait.
//!
//! - [`OnnxColorizer`]: pretrained colorization network with host-side cluster head
//!
//! [`ChromaPredictor`]: crate::application::port::ChromaPredictor

mod colorizer;

pub use colorizer::OnnxColorizer;
