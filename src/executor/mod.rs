//! Agent task executor.
//!
//! Runs one [`AgentTask`](crate::config::AgentTask) through the ordered
//! pipeline:
//!
//! 1. Steps (fail-fast)
//! 2. Safety gates (all run; required failures fail the phase)
//! 3. Git operations (commit/push/PR, only when push is enabled)
//! 4. Notifications (best-effort, never fail the run)
//!
//! Phases execute strictly forward; a failure in phase N prevents later
//! phases, except notifications, which fire on both the success and failure
//! paths. When rollback is enabled, a gate or git failure triggers a
//! destructive recovery of the working tree before the error is returned.
//!
//! The executor is stateless between invocations and returns exactly one
//! error (naming the failed phase) per run. Every unit of work is a
//! synchronous, blocking call with no internal timeout.

use crate::config::{AgentSettings, AgentTask};
use crate::error::{GroveError, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::process::Command;

mod gates;
mod git_ops;
mod gsd;
mod notify;
mod steps;

/// Metadata accumulated during one execution, recorded into history.
#[derive(Debug, Default, Clone)]
pub struct ExecutionReport {
    /// Number of steps that ran to completion.
    pub steps_executed: u32,
    /// Commit SHAs created by the git phase.
    pub commits: Vec<String>,
    /// Pull request URL, when one was opened.
    pub pr_url: Option<String>,
    /// Non-fatal problems (failing optional gates, missing PR tool, ...).
    pub warnings: Vec<String>,
}

/// Runs one agent task definition through the pipeline.
pub struct Executor<'a> {
    task: &'a AgentTask,
    settings: &'a AgentSettings,
    /// Execution root: the resolved worktree directory or the primary checkout.
    workdir: PathBuf,
}

impl<'a> Executor<'a> {
    pub fn new(task: &'a AgentTask, settings: &'a AgentSettings, workdir: PathBuf) -> Self {
        Self {
            task,
            settings,
            workdir,
        }
    }

    /// Execute the task. Returns the report on success, or the first phase
    /// error after rollback and notifications have had their chance to run.
    pub fn execute(&self) -> Result<ExecutionReport> {
        let mut report = ExecutionReport::default();

        let outcome = if self.task.uses_gsd_workflow() {
            self.run_gsd_workflow(&mut report)
        } else {
            self.run_pipeline(&mut report)
        };

        if let Err(err) = &outcome {
            // Steps (phase 1) leave the tree as the failing command left it;
            // only gate and git failures trigger the destructive recovery.
            if self.task.safety.rollback.enabled
                && matches!(err, GroveError::GateError(_) | GroveError::GitError(_))
            {
                self.rollback(&mut report);
            }
        }

        self.dispatch_notifications(outcome.is_ok(), &mut report);

        outcome.map(|()| report)
    }

    fn run_pipeline(&self, report: &mut ExecutionReport) -> Result<()> {
        self.run_steps(report)?;
        self.run_gates(report)?;
        self.run_git_phase(report)?;
        Ok(())
    }

    /// Substitute `{date}` and `{task}` placeholders.
    fn render(&self, template: &str) -> String {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        template
            .replace("{date}", &date)
            .replace("{task}", &self.task.name)
    }
}

/// Check whether an external tool is available on PATH.
///
/// An explicit capability probe; callers must not infer availability from
/// error-message text.
pub fn tool_available(binary: &str) -> bool {
    Command::new(binary)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
