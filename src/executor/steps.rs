//! Step execution: the first (and only required) pipeline phase.
//!
//! Steps run strictly in declared order and inherit the caller's output
//! streams, so an operator watching an interactive run sees step output
//! live. The first failing step aborts the entire run; remaining steps
//! never execute.

use super::{ExecutionReport, Executor};
use crate::config::Step;
use crate::error::{GroveError, Result};
use std::io::ErrorKind;
use std::process::Command;

/// Environment variable exported to the coding-agent CLI in autonomous mode.
const YOLO_ENV_VAR: &str = "GROVE_AGENT_YOLO";

/// Flag passed to the coding-agent CLI to bypass permission prompts.
const YOLO_FLAG: &str = "--dangerously-skip-permissions";

impl Executor<'_> {
    pub(super) fn run_steps(&self, report: &mut ExecutionReport) -> Result<()> {
        for step in &self.task.steps {
            println!("==> step: {}", step.name());
            match step {
                Step::Shell {
                    name,
                    command,
                    working_dir,
                } => self.run_shell_step(name, command, working_dir.as_deref())?,
                Step::Skill { name, instruction } => self.run_skill_step(name, instruction)?,
            }
            report.steps_executed += 1;
        }
        Ok(())
    }

    fn run_shell_step(&self, name: &str, command: &str, working_dir: Option<&str>) -> Result<()> {
        let args = shell_words::split(command).map_err(|e| {
            GroveError::StepError(format!("step '{}': failed to parse command: {}", name, e))
        })?;
        let (program, rest) = args.split_first().ok_or_else(|| {
            GroveError::StepError(format!("step '{}': command is empty", name))
        })?;

        let cwd = match working_dir {
            Some(dir) => self.workdir.join(dir),
            None => self.workdir.clone(),
        };

        let status = Command::new(program)
            .args(rest)
            .current_dir(&cwd)
            .status()
            .map_err(|e| {
                GroveError::StepError(format!(
                    "step '{}': failed to execute '{}': {}\n\
                     Fix: ensure the command is installed and in PATH.",
                    name, program, e
                ))
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(GroveError::StepError(format!(
                "step '{}': '{}' exited with code {}",
                name,
                command,
                status.code().unwrap_or(-1)
            )))
        }
    }

    fn run_skill_step(&self, name: &str, instruction: &str) -> Result<()> {
        let mut command = Command::new(&self.settings.skill_command);
        command
            .arg("-p")
            .arg(instruction)
            .current_dir(&self.workdir);

        if self.task.context.yolo {
            command.arg(YOLO_FLAG);
            command.env(YOLO_ENV_VAR, "1");
        }

        let status = command.status().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                GroveError::ToolUnavailable(format!(
                    "'{}' (needed by skill step '{}')",
                    self.settings.skill_command, name
                ))
            } else {
                GroveError::StepError(format!(
                    "step '{}': failed to execute '{}': {}",
                    name, self.settings.skill_command, e
                ))
            }
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(GroveError::StepError(format!(
                "step '{}': agent invocation exited with code {}",
                name,
                status.code().unwrap_or(-1)
            )))
        }
    }
}
