use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::tree::TreeSnapshot;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Holds the most recent resolved tree so a later run against the same root
/// can skip the descent.
///
/// Entries are matched on the exact root folder id. There is no expiry and no
/// locking: a hit is trusted as-is, and concurrent runs may overwrite each
/// other.
pub trait SnapshotCache {
    fn load(&self, root_id: &str) -> Result<Option<TreeSnapshot>, SnapshotError>;
    fn store(&self, snapshot: &TreeSnapshot) -> Result<(), SnapshotError>;
}

/// Single-entry cache kept as a pretty-printed JSON document.
pub struct JsonSnapshotCache {
    path: PathBuf,
}

impl JsonSnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotCache for JsonSnapshotCache {
    fn load(&self, root_id: &str) -> Result<Option<TreeSnapshot>, SnapshotError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let snapshot: TreeSnapshot = serde_json::from_slice(&data)?;
        if snapshot.folder_id != root_id {
            tracing::debug!(
                cached = %snapshot.folder_id,
                requested = root_id,
                "snapshot belongs to another root"
            );
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    fn store(&self, snapshot: &TreeSnapshot) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
