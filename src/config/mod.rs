// SPDX-License-Identifier: MPL-2.0
//! This module handles the application's configuration, including loading and saving
//! it to a `settings.toml` file.
//!
//! Every path the tools touch (model artifacts, batch folders, upload folder)
//! is a field here with a documented default, see [`defaults`].
//!
//! # Examples
//!
//! ```no_run
//! use chroma_lens::config::{self, Config};
//! use std::path::PathBuf;
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Modify a setting
//! config.batch.output_dir = PathBuf::from("./colorized");
//!
//! // To load/save from a specific path (e.g., for testing)
//! let temp_dir = PathBuf::from("./temp_config_dir");
//! std::fs::create_dir_all(&temp_dir).unwrap();
//! let temp_file = temp_dir.join("test_settings.toml");
//! config::save_to_path(&config, &temp_file).expect("Failed to save to path");
//! let loaded_config = config::load_from_path(&temp_file).expect("Failed to load from path");
//! assert_eq!(loaded_config.batch.output_dir, PathBuf::from("./colorized"));
//! std::fs::remove_dir_all(&temp_dir).unwrap();
//! ```

pub mod defaults;

use crate::error::{Error, Result};
use crate::evaluation::PairingPolicy;
use crate::media::model::ModelArtifacts;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "ChromaLens";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub evaluate: EvaluateConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Locations of the three model artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub topology: PathBuf,
    pub weights: PathBuf,
    pub points: PathBuf,
    /// Optional BLAKE3 hex digest of the topology file.
    pub checksum: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            topology: PathBuf::from(DEFAULT_TOPOLOGY_PATH),
            weights: PathBuf::from(DEFAULT_WEIGHTS_PATH),
            points: PathBuf::from(DEFAULT_POINTS_PATH),
            checksum: None,
        }
    }
}

impl ModelConfig {
    pub fn artifacts(&self) -> ModelArtifacts {
        ModelArtifacts {
            topology: self.topology.clone(),
            weights: self.weights.clone(),
            points: self.points.clone(),
            checksum: self.checksum.clone(),
        }
    }
}

/// Folders of a batch colorize-and-score run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub gray_dir: PathBuf,
    pub color_dir: PathBuf,
    pub output_dir: PathBuf,
    pub pairing: PairingPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            gray_dir: PathBuf::from(DEFAULT_GRAY_DIR),
            color_dir: PathBuf::from(DEFAULT_COLOR_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            pairing: PairingPolicy::Lenient,
        }
    }
}

/// Folders of a metric-only corpus comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluateConfig {
    pub reference_dir: PathBuf,
    pub candidate_dir: PathBuf,
    pub pairing: PairingPolicy,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::from(DEFAULT_COLOR_DIR),
            candidate_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            pairing: PairingPolicy::Strict,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDR.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub ssim_window: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            ssim_window: DEFAULT_SSIM_WINDOW,
        }
    }
}

impl Config {
    /// Rejects values the tools cannot run with.
    pub fn validate(&self) -> Result<()> {
        let window = self.metrics.ssim_window;
        if window % 2 == 0 || !(MIN_SSIM_DIMENSION..=MAX_SSIM_WINDOW).contains(&window) {
            return Err(Error::Config(format!(
                "metrics.ssim_window must be odd and within {MIN_SSIM_DIMENSION}..={MAX_SSIM_WINDOW}, got {window}"
            )));
        }
        if self.server.max_upload_bytes < MIN_MAX_UPLOAD_BYTES {
            return Err(Error::Config(format!(
                "server.max_upload_bytes must be at least {MIN_MAX_UPLOAD_BYTES}, got {}",
                self.server.max_upload_bytes
            )));
        }
        Ok(())
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
