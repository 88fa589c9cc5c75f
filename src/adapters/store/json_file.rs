use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Snapshot;
use crate::ports::SnapshotStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt snapshot file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialize error: {0}")]
    Serialize(serde_json::Error),
}

/// Snapshot store backed by a single JSON file keyed by site name.
///
/// A missing file means first run. A file that exists but does not
/// deserialize is reported as corrupt, never as "no prior state" - resetting
/// history would make every already-known site look new again.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>, Box<dyn std::error::Error + Send + Sync>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e).into()),
        };

        let snapshot = serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let json = serde_json::to_string(snapshot).map_err(StoreError::Serialize)?;

        // Write to a sibling temp file and rename, so a crash mid-write
        // cannot corrupt the only history we keep.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(StoreError::Io)?;
        fs::rename(&tmp, &self.path).map_err(StoreError::Io)?;
        Ok(())
    }
}
