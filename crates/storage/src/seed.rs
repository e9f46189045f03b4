use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::memory::ReferenceDirectory;
use crate::record::ProblemRecord;

/// On-disk seed for a [`MemoryStore`](crate::MemoryStore).
///
/// ```json
/// {
///   "references": { "sys_user": { "abc123": "Beth Anglin" } },
///   "problems": [ { "number": "PRB0040001", "fields": { ... } } ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub references: ReferenceDirectory,
    #[serde(default)]
    pub problems: Vec<ProblemRecord>,
}

impl SeedFile {
    pub fn from_json(text: &str) -> Result<Self, StorageError> {
        serde_json::from_str(text)
            .map_err(|e| StorageError::Backend(format!("invalid seed file: {}", e)))
    }

    pub fn from_path(path: &Path) -> Result<Self, StorageError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            StorageError::Backend(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }
}
