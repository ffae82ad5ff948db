//! Studio configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::time::constants::MAX_PRECISION;
use crate::markers::EditKind;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioConfig {
    /// JSON file holding the marker pairs of all clips.
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,
    /// Fraction digits shown for times. Default: 3.
    #[serde(default = "default_time_precision")]
    pub time_precision: usize,
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Save immediately when a marker drag ends. Default: true.
    #[serde(default = "default_persist_on_release")]
    pub persist_on_release: bool,
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("capstudio-markers.json")
}

fn default_time_precision() -> usize {
    3
}

fn default_log_filter() -> String {
    "capstudio=debug,warn".to_string()
}

fn default_persist_on_release() -> bool {
    true
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            settings_path: default_settings_path(),
            time_precision: default_time_precision(),
            log_filter: default_log_filter(),
            persist_on_release: default_persist_on_release(),
        }
    }
}

impl StudioConfig {
    /// Read a JSON config. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn precision(&self) -> usize {
        self.time_precision.min(MAX_PRECISION)
    }

    /// Edit kind applied when a drag is released.
    pub fn release_edit(&self) -> EditKind {
        if self.persist_on_release {
            EditKind::CommitAndPersist
        } else {
            EditKind::Commit
        }
    }
}
