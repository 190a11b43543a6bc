// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//!
//! # Available Ports
//!
//! - [`ai`]: Chrominance prediction (the network forward pass)

pub mod ai;

// Re-export main types for convenience
pub use ai::{ChromaPredictor, PredictError, PredictorCapabilities};
