//! Alternate ("GSD") workflow.
//!
//! Tasks configured for the alternate workflow bypass the standard
//! step/gate/git pipeline entirely. The executor reads an optional task
//! brief from a well-known path in the project root, then drives the
//! external planning CLI through a short scripted sequence: create a
//! milestone, plan it, and optionally execute the plan. Notifications still
//! run afterwards on the common path in `execute()`.

use super::{ExecutionReport, Executor};
use crate::error::{GroveError, Result};
use std::io::ErrorKind;
use std::process::Command;

/// Well-known task-brief file, relative to the execution root.
const BRIEF_FILE: &str = "TASK_BRIEF.md";

impl Executor<'_> {
    pub(super) fn run_gsd_workflow(&self, report: &mut ExecutionReport) -> Result<()> {
        let auto_execute = self
            .task
            .gsd
            .as_ref()
            .is_some_and(|g| g.auto_execute);

        let brief = self.read_brief();
        if brief.is_none() {
            println!("gsd: no {} found, continuing without a brief", BRIEF_FILE);
        }

        let mut milestone_args = vec!["new-milestone".to_string(), self.task.name.clone()];
        if let Some(brief) = brief {
            milestone_args.push("--notes".to_string());
            milestone_args.push(brief);
        }

        self.run_gsd_command(&milestone_args, report)?;
        self.run_gsd_command(&["plan".to_string()], report)?;

        if auto_execute {
            self.run_gsd_command(&["execute".to_string()], report)?;
        }

        Ok(())
    }

    fn read_brief(&self) -> Option<String> {
        let path = self.workdir.join(BRIEF_FILE);
        std::fs::read_to_string(path)
            .ok()
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
    }

    fn run_gsd_command(&self, args: &[String], report: &mut ExecutionReport) -> Result<()> {
        println!("==> gsd {}", args.first().map(String::as_str).unwrap_or(""));

        let status = Command::new(&self.settings.gsd_command)
            .args(args)
            .current_dir(&self.workdir)
            .status()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    GroveError::ToolUnavailable(format!(
                        "'{}' (needed by the alternate workflow)",
                        self.settings.gsd_command
                    ))
                } else {
                    GroveError::StepError(format!(
                        "failed to execute '{}': {}",
                        self.settings.gsd_command, e
                    ))
                }
            })?;

        if status.success() {
            report.steps_executed += 1;
            Ok(())
        } else {
            Err(GroveError::StepError(format!(
                "gsd {} exited with code {}",
                args.first().map(String::as_str).unwrap_or(""),
                status.code().unwrap_or(-1)
            )))
        }
    }
}
