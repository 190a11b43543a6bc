// SPDX-License-Identifier: MPL-2.0
//! Application layer.
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//!
//! The colorization pipeline in [`crate::media`] only sees the
//! [`port::ChromaPredictor`] trait; the ONNX adapter in
//! [`crate::infrastructure`] implements it.

pub mod port;
