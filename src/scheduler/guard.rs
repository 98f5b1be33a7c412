//! Per-task overlap guard.
//!
//! A cron tick for a task must never run concurrently with an earlier tick
//! of the same task. The guard is a set of currently-running task names
//! behind one lock; check-and-set and clear both happen under that lock.

use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
pub struct RunningGuard {
    running: Mutex<HashSet<String>>,
}

impl RunningGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically mark a task as running. Returns false if it already is,
    /// in which case the caller must skip this tick.
    pub fn try_begin(&self, name: &str) -> bool {
        let mut running = self
            .running
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        running.insert(name.to_string())
    }

    /// Clear the running mark. Called when the job body returns, on both
    /// the success and failure paths.
    pub fn end(&self, name: &str) {
        let mut running = self
            .running
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        running.remove(name);
    }
}
