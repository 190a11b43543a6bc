// SPDX-License-Identifier: MPL-2.0
//! Loading of the pretrained colorization network.
//!
//! This module provides functionality for:
//! - Checking that the topology, weights and cluster-center files exist
//! - Verifying model integrity with an optional BLAKE3 checksum
//! - Reading the `(N, 2)` cluster centers from a NumPy `.npy` file
//! - Building the ONNX Runtime session and running the raw forward pass

use crate::application::port::PredictError;
use crate::config::defaults::REBALANCE_FACTOR;
use crate::media::cluster_head::{ClusterHead, HEAD_LAYERS};
use ndarray::{Array2, Array4, ArrayD, Ix2};
use ndarray_npy::read_npy;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// Result type for model loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Which of the three artifacts a [`LoadError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Topology,
    Weights,
    Points,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Topology => write!(f, "topology"),
            ArtifactKind::Weights => write!(f, "weights"),
            ArtifactKind::Points => write!(f, "cluster points"),
        }
    }
}

/// Errors that can occur while loading the model.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// An artifact file does not exist.
    #[error("{kind} file not found: {}", .path.display())]
    MissingArtifact { kind: ArtifactKind, path: PathBuf },

    /// An artifact exists but could not be read or parsed.
    #[error("cannot read {kind} file {}: {reason}", .path.display())]
    Unreadable {
        kind: ArtifactKind,
        path: PathBuf,
        reason: String,
    },

    /// The cluster centers are not laid out as `(N, 2)`.
    #[error("cluster points must have shape (N, 2), got {shape:?}")]
    PointsShape { shape: Vec<usize> },

    /// Topology checksum verification failed.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

/// Paths of the three files the network is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    pub topology: PathBuf,
    /// External-data file referenced by the topology. Equal to `topology`
    /// for a self-contained ONNX file.
    pub weights: PathBuf,
    pub points: PathBuf,
    /// Expected BLAKE3 hex digest of the topology file.
    pub checksum: Option<String>,
}

impl ModelArtifacts {
    fn ensure_present(&self) -> LoadResult<()> {
        for (kind, path) in [
            (ArtifactKind::Topology, &self.topology),
            (ArtifactKind::Weights, &self.weights),
            (ArtifactKind::Points, &self.points),
        ] {
            if !path.is_file() {
                return Err(LoadError::MissingArtifact {
                    kind,
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }

    /// ONNX Runtime resolves external data relative to the topology file, so
    /// a separate weights file must live in the topology's directory.
    fn ensure_weights_beside_topology(&self) -> LoadResult<()> {
        let canonical = |kind: ArtifactKind, path: &Path| {
            path.canonicalize().map_err(|e| LoadError::Unreadable {
                kind,
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        };
        let topology = canonical(ArtifactKind::Topology, &self.topology)?;
        let weights = canonical(ArtifactKind::Weights, &self.weights)?;

        if weights == topology || weights.parent() == topology.parent() {
            return Ok(());
        }
        let folder = topology.parent().unwrap_or(Path::new(""));
        Err(LoadError::Unreadable {
            kind: ArtifactKind::Weights,
            path: self.weights.clone(),
            reason: format!(
                "external weights must be in the topology's folder {}",
                folder.display()
            ),
        })
    }
}

/// One row of the model summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    pub index: usize,
    pub name: String,
    pub kind: String,
    pub blobs: usize,
}

/// The loaded network: an ONNX session plus the cluster head.
///
/// Immutable after [`ColorizationModel::load`]. The session sits behind a
/// mutex because ONNX Runtime needs exclusive access to run.
pub struct ColorizationModel {
    session: Mutex<Session>,
    input_names: Vec<String>,
    output_names: Vec<String>,
    head: ClusterHead,
    artifacts: ModelArtifacts,
}

impl fmt::Debug for ColorizationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorizationModel")
            .field("input_names", &self.input_names)
            .field("output_names", &self.output_names)
            .field("classes", &self.head.classes())
            .field("artifacts", &self.artifacts)
            .finish_non_exhaustive()
    }
}

impl ColorizationModel {
    /// Loads and validates all three artifacts and builds the session.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if any file is missing or unreadable, the
    /// checksum does not match, or the points are not shaped `(N, 2)`.
    pub fn load(artifacts: &ModelArtifacts) -> LoadResult<Self> {
        artifacts.ensure_present()?;
        artifacts.ensure_weights_beside_topology()?;

        if let Some(expected) = &artifacts.checksum {
            verify_checksum(&artifacts.topology, expected)?;
        }

        let points = load_points(&artifacts.points)?;
        let head = ClusterHead::new(points, REBALANCE_FACTOR);
        debug!(classes = head.classes(), "cluster points loaded");

        let session = Session::builder()
            .map_err(|e| session_error(artifacts, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| session_error(artifacts, e))?
            .commit_from_file(&artifacts.topology)
            .map_err(|e| session_error(artifacts, e))?;

        let input_names: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        if input_names.is_empty() {
            return Err(LoadError::Unreadable {
                kind: ArtifactKind::Topology,
                path: artifacts.topology.clone(),
                reason: "graph declares no inputs".to_string(),
            });
        }

        info!(
            topology = %artifacts.topology.display(),
            inputs = ?input_names,
            outputs = ?output_names,
            "colorization model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_names,
            output_names,
            head,
            artifacts: artifacts.clone(),
        })
    }

    pub fn head(&self) -> &ClusterHead {
        &self.head
    }

    /// Runs the network body on an NCHW tensor and returns its first output.
    pub fn forward(&self, input: &Array4<f32>) -> Result<Array4<f32>, PredictError> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| PredictError::ModelNotReady)?;

        // Ensure standard layout for ONNX Runtime
        let input = input.as_standard_layout().into_owned();

        let input_ref = ort::value::TensorRef::from_array_view(&input)
            .map_err(|e| PredictError::InvalidInput(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_names[0].as_str() => input_ref])
            .map_err(|e| PredictError::InferenceFailed(e.to_string()))?;

        let (_, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| PredictError::UnexpectedOutput("no output tensor".to_string()))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e: ort::Error| PredictError::UnexpectedOutput(e.to_string()))?;

        // Shape is NCHW: [batch, channels, height, width]
        if shape.len() != 4 {
            return Err(PredictError::UnexpectedOutput(format!(
                "expected 4D tensor, got {}D",
                shape.len()
            )));
        }

        let dims = (
            shape[0] as usize,
            shape[1] as usize,
            shape[2] as usize,
            shape[3] as usize,
        );
        Array4::from_shape_vec(dims, data.to_vec())
            .map_err(|e| PredictError::UnexpectedOutput(e.to_string()))
    }

    /// Graph inputs, graph outputs, then the host-side head layers.
    pub fn layers(&self) -> Vec<LayerInfo> {
        let io = self
            .input_names
            .iter()
            .map(|name| (name.clone(), "Input", 0))
            .chain(self.output_names.iter().map(|name| (name.clone(), "Output", 0)));
        let head = HEAD_LAYERS
            .iter()
            .map(|(name, kind, blobs)| (name.to_string(), *kind, *blobs));

        io.chain(head)
            .enumerate()
            .map(|(i, (name, kind, blobs))| LayerInfo {
                index: i + 1,
                name,
                kind: kind.to_string(),
                blobs,
            })
            .collect()
    }
}

fn session_error(artifacts: &ModelArtifacts, err: impl fmt::Display) -> LoadError {
    LoadError::Unreadable {
        kind: ArtifactKind::Topology,
        path: artifacts.topology.clone(),
        reason: err.to_string(),
    }
}

/// Verifies a file against a BLAKE3 hex digest.
pub fn verify_checksum(path: &Path, expected_hash: &str) -> LoadResult<()> {
    let actual_hash = compute_file_hash(path)?;
    if !actual_hash.eq_ignore_ascii_case(expected_hash) {
        return Err(LoadError::ChecksumMismatch {
            expected: expected_hash.to_string(),
            actual: actual_hash,
        });
    }
    Ok(())
}

/// Computes the BLAKE3 hash of a model file.
pub fn compute_file_hash(path: &Path) -> LoadResult<String> {
    let file_data = std::fs::read(path).map_err(|e| LoadError::Unreadable {
        kind: ArtifactKind::Topology,
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(blake3::hash(&file_data).to_hex().to_string())
}

/// Reads the cluster centers, accepting float64, int64 and float32 arrays.
pub fn load_points(path: &Path) -> LoadResult<Array2<f32>> {
    let raw: ArrayD<f32> = read_npy::<_, ArrayD<f64>>(path)
        .map(|a| a.mapv(|v| v as f32))
        .or_else(|_| read_npy::<_, ArrayD<i64>>(path).map(|a| a.mapv(|v| v as f32)))
        .or_else(|_| read_npy::<_, ArrayD<f32>>(path))
        .map_err(|e| LoadError::Unreadable {
            kind: ArtifactKind::Points,
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let shape = raw.shape().to_vec();
    if shape.len() != 2 || shape[1] != 2 || shape[0] == 0 {
        return Err(LoadError::PointsShape { shape });
    }

    raw.into_dimensionality::<Ix2>()
        .map_err(|_| LoadError::PointsShape { shape })
}
