//! Durable agent task queue for grove.
//!
//! The queue is a crash-safe, single-process-local store of pending,
//! in-flight, and finished agent task requests, backed by one JSON file
//! (`.grove/queue.json`, a document with a `tasks` array). Every mutation
//! rewrites the full document atomically (temp file + rename) before the
//! call returns, so a crash between operations can never leave a
//! half-written or inconsistent file.
//!
//! Status lifecycle is monotonic:
//!
//! ```text
//! pending -> running -> completed
//!         \          -> failed
//!          -> failed  (definition missing, never ran)
//! ```
//!
//! One in-process `RwLock` guards the in-memory document. There is no
//! cross-process coordination; two processes sharing one queue file is
//! unsupported.

use crate::error::{GroveError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;

pub mod drain;
mod io;
mod mutations;

pub use drain::{drain_all, drain_one, DrainOutcome, DrainSummary};

/// Lifecycle status of a queued task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Whether a transition from `self` to `next` is allowed.
    ///
    /// Transitions only move forward: pending to running, running to a
    /// terminal state. Pending may also fail directly, for entries that can
    /// never run (e.g. the referenced task definition no longer exists).
    /// Nothing moves backward and nothing skips running into completed.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Pending, TaskStatus::Failed)
                | (TaskStatus::Running, TaskStatus::Completed)
                | (TaskStatus::Running, TaskStatus::Failed)
        )
    }

    /// Terminal statuses are eligible for `clear()`.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = GroveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "running" => Ok(TaskStatus::Running),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(GroveError::UserError(format!(
                "unknown status '{}' (expected pending, running, completed, or failed)",
                other
            ))),
        }
    }
}

/// One queued agent task request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedTask {
    /// Globally unique id.
    pub id: String,

    /// Name of the agent task definition this entry references.
    pub agent_name: String,

    /// Target worktree name.
    pub worktree: String,

    pub status: TaskStatus,

    pub created_at: DateTime<Utc>,

    /// Set when the entry enters `running`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Set when the entry enters `completed` or `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Wall-clock duration, completed_at - started_at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,

    /// Error text, set only on `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The persisted queue document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct QueueDocument {
    pub(crate) tasks: Vec<QueuedTask>,
}

/// The durable task queue.
pub struct TaskQueue {
    path: PathBuf,
    inner: RwLock<QueueDocument>,
}

impl TaskQueue {
    /// Return the first entry (insertion order) with status pending.
    ///
    /// Non-mutating: repeated calls without an intervening status update
    /// return the same entry.
    pub fn next(&self) -> Option<QueuedTask> {
        let doc = self.read_lock();
        doc.tasks
            .iter()
            .find(|t| t.status == TaskStatus::Pending)
            .cloned()
    }

    /// List entries, optionally filtered by status. `None` means all.
    pub fn list(&self, filter: Option<TaskStatus>) -> Vec<QueuedTask> {
        let doc = self.read_lock();
        doc.tasks
            .iter()
            .filter(|t| filter.is_none_or(|f| t.status == f))
            .cloned()
            .collect()
    }

    /// Count entries, optionally filtered by status. `None` means all.
    pub fn count(&self, filter: Option<TaskStatus>) -> usize {
        let doc = self.read_lock();
        doc.tasks
            .iter()
            .filter(|t| filter.is_none_or(|f| t.status == f))
            .count()
    }

    /// Get one entry by id.
    pub fn get(&self, id: &str) -> Option<QueuedTask> {
        let doc = self.read_lock();
        doc.tasks.iter().find(|t| t.id == id).cloned()
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, QueueDocument> {
        self.inner.read().unwrap_or_else(|poison| poison.into_inner())
    }

    pub(crate) fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, QueueDocument> {
        self.inner
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}
