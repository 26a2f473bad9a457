//! Pipeline Configuration Module
//! File locations handed to every stage.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

const RAW_FILE: &str = "raw/laliga_all_players_stats.csv";
const CANONICAL_FILE: &str = "processed/players_clean.csv";
const CLEANED_FILE: &str = "cleaned/players_cleaned.csv";
const PLAYERS_FILE: &str = "transformed/players_transformed.csv";
const TEAMS_FILE: &str = "transformed/teams_aggregated.csv";

/// Input and output locations of the three stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw source table read by ingest.
    pub raw_path: PathBuf,
    /// Canonical-schema table written by ingest, read by clean.
    pub canonical_path: PathBuf,
    /// Cleaned table written by clean, read by transform.
    pub cleaned_path: PathBuf,
    /// Per-player output of transform.
    pub players_path: PathBuf,
    /// Per-team output of transform.
    pub teams_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::rooted_at("data")
    }
}

impl PipelineConfig {
    /// Default file layout under the given data directory.
    pub fn rooted_at(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            raw_path: dir.join(RAW_FILE),
            canonical_path: dir.join(CANONICAL_FILE),
            cleaned_path: dir.join(CLEANED_FILE),
            players_path: dir.join(PLAYERS_FILE),
            teams_path: dir.join(TEAMS_FILE),
        }
    }

    /// Load a TOML config file. Missing keys fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
