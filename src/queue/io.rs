//! Queue file I/O: load on open, atomic persist on every mutation.

use super::{QueueDocument, TaskQueue};
use crate::error::{GroveError, Result};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

impl TaskQueue {
    /// Open the queue backed by the given file.
    ///
    /// A missing file is an empty queue; it is created on the first mutation.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();

        let document = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                GroveError::QueueError(format!(
                    "failed to read queue file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                GroveError::QueueError(format!(
                    "queue file '{}' is not valid JSON: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            QueueDocument::default()
        };

        Ok(Self {
            path,
            inner: RwLock::new(document),
        })
    }

    /// Serialize the full document and write it atomically.
    ///
    /// Called by every mutator while holding the write lock, so the on-disk
    /// file always reflects a complete, consistent document.
    pub(crate) fn persist(&self, doc: &QueueDocument) -> Result<()> {
        let content = serde_json::to_string_pretty(doc)
            .map_err(|e| GroveError::QueueError(format!("failed to serialize queue: {}", e)))?;
        crate::fs::atomic_write_file(&self.path, &content)
            .map_err(|e| GroveError::QueueError(e.to_string()))
    }
}
