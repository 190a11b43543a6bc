// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! This module contains concrete implementations of the port traits defined in
//! `application::port`. These adapters wrap external dependencies like
//! ONNX Runtime.
//!
//! - [`onnx`]: Network inference via ONNX Runtime (implements [`ChromaPredictor`])
//!
//! [`ChromaPredictor`]: crate::application::port::ChromaPredictor

pub mod onnx;

pub use onnx::OnnxColorizer;
