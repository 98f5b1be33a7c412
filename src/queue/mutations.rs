//! Queue mutators. Every mutation persists synchronously before returning.

use super::{QueuedTask, TaskQueue, TaskStatus};
use crate::error::{GroveError, Result};
use chrono::Utc;
use uuid::Uuid;

impl TaskQueue {
    /// Append a new pending entry and persist it.
    pub fn add(&self, agent_name: &str, worktree: &str) -> Result<QueuedTask> {
        let task = QueuedTask {
            id: Uuid::new_v4().to_string(),
            agent_name: agent_name.to_string(),
            worktree: worktree.to_string(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            duration_ms: None,
            error: None,
        };

        let mut doc = self.write_lock();
        doc.tasks.push(task.clone());
        self.persist(&doc)?;
        Ok(task)
    }

    /// Transition an entry to a new status. The only status mutator.
    ///
    /// Entering `running` sets `started_at`; entering a terminal status sets
    /// `completed_at`, computes `duration_ms`, and records the error text if
    /// given. An unknown id or a non-monotonic transition fails and leaves
    /// the file untouched.
    pub fn update_status(
        &self,
        id: &str,
        new_status: TaskStatus,
        error: Option<&str>,
    ) -> Result<QueuedTask> {
        let mut doc = self.write_lock();

        let task = doc
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| GroveError::QueueError(format!("no queued task with id '{}'", id)))?;

        if !task.status.can_transition_to(new_status) {
            return Err(GroveError::QueueError(format!(
                "invalid status transition {} -> {} for task '{}'",
                task.status, new_status, id
            )));
        }

        let now = Utc::now();
        task.status = new_status;
        match new_status {
            TaskStatus::Running => {
                task.started_at = Some(now);
            }
            TaskStatus::Completed | TaskStatus::Failed => {
                task.completed_at = Some(now);
                task.duration_ms = task
                    .started_at
                    .map(|started| (now - started).num_milliseconds());
                if new_status == TaskStatus::Failed {
                    task.error = error.map(|e| e.to_string());
                }
            }
            TaskStatus::Pending => unreachable!("no transition targets pending"),
        }

        let updated = task.clone();
        self.persist(&doc)?;
        Ok(updated)
    }

    /// Delete one entry by id. Unknown id is an error.
    pub fn remove(&self, id: &str) -> Result<QueuedTask> {
        let mut doc = self.write_lock();

        let index = doc
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| GroveError::QueueError(format!("no queued task with id '{}'", id)))?;

        let removed = doc.tasks.remove(index);
        self.persist(&doc)?;
        Ok(removed)
    }

    /// Remove every completed or failed entry; pending and running entries
    /// are kept untouched. Returns the number of entries removed.
    pub fn clear(&self) -> Result<usize> {
        let mut doc = self.write_lock();

        let before = doc.tasks.len();
        doc.tasks.retain(|t| !t.status.is_terminal());
        let removed = before - doc.tasks.len();

        self.persist(&doc)?;
        Ok(removed)
    }
}
