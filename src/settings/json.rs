//! JSON file backed marker store.
//!
//! One document holds the marker pairs of every clip:
//!
//! ```json
//! { "version": 1,
//!   "markers": { "clip-1": { "in_point": 10000000000, "out_point": 50000000000,
//!                            "label": "[00:00:10.000 - 00:00:50.000]" } } }
//! ```
//!
//! Times are integer nanoseconds so a save/load cycle is exact. The label is
//! written for people reading the file and ignored on load.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::time::TimeValue;
use crate::settings::store::{MarkerState, MarkerStateStore, PersistenceError};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct MarkerRecord {
    in_point: TimeValue,
    out_point: TimeValue,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    label: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    markers: BTreeMap<String, MarkerRecord>,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            markers: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<SettingsDocument, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(SettingsDocument::default()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(SettingsDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file, then rename over the target.
    fn write_document(&self, document: &SettingsDocument) -> Result<(), PersistenceError> {
        let text = serde_json::to_string_pretty(document)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl MarkerStateStore for JsonFileStore {
    fn load_marker_state(&self, key: &str) -> Result<Option<MarkerState>, PersistenceError> {
        let document = self.read_document()?;
        Ok(document
            .markers
            .get(key)
            .map(|record| MarkerState::new(record.in_point, record.out_point)))
    }

    fn save_marker_state(&self, key: &str, state: MarkerState) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut document = self.read_document()?;
        document.markers.insert(
            key.to_string(),
            MarkerRecord {
                in_point: state.in_point,
                out_point: state.out_point,
                label: state.to_string(),
            },
        );
        self.write_document(&document)?;
        debug!(key, path = %self.path.display(), "wrote marker state");
        Ok(())
    }
}
