//! Execution history for agent runs.
//!
//! An append-only, size-bounded log of past executions in
//! `.grove/history.json` (a JSON array, oldest first, capped at
//! [`MAX_RECORDS`]). The agent core only ever appends; reading is for
//! reporting commands and tests.

use crate::error::{GroveError, Result};
use crate::fs::atomic_write_file;
use crate::queue::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum number of retained records; the oldest are dropped first.
pub const MAX_RECORDS: usize = 1000;

/// One past execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub agent_name: String,
    pub worktree: String,
    pub status: TaskStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_executed: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commits: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
}

/// Append-only execution history file.
pub struct ExecutionHistory {
    path: PathBuf,
}

impl ExecutionHistory {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Append one record, enforcing the size cap, and persist atomically.
    pub fn append(&self, record: ExecutionRecord) -> Result<()> {
        let mut records = self.load()?;
        records.push(record);

        if records.len() > MAX_RECORDS {
            let excess = records.len() - MAX_RECORDS;
            records.drain(..excess);
        }

        let content = serde_json::to_string_pretty(&records)
            .map_err(|e| GroveError::UserError(format!("failed to serialize history: {}", e)))?;
        atomic_write_file(&self.path, &content)
    }

    /// Load all records. A missing file is an empty history.
    pub fn load(&self) -> Result<Vec<ExecutionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            GroveError::UserError(format!(
                "failed to read history file '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            GroveError::UserError(format!(
                "history file '{}' is not valid JSON: {}",
                self.path.display(),
                e
            ))
        })
    }
}
