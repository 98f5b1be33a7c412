//! Error types for the grove CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for grove operations.
///
/// Each variant maps to a specific exit code. The executor wraps every phase
/// failure in one of these so callers always see which phase went wrong.
#[derive(Error, Debug)]
pub enum GroveError {
    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// Agent task configuration is invalid (bad cron expression, missing fields).
    /// Fails only the affected task's registration; sibling tasks are unaffected.
    #[error("Invalid agent configuration: {0}")]
    ConfigError(String),

    /// A pipeline step failed. Fatal to the run; remaining steps never execute.
    #[error("Step failed: {0}")]
    StepError(String),

    /// At least one required safety gate failed.
    #[error("Safety gates failed: {0}")]
    GateError(String),

    /// Git operation failed.
    #[error("Git operation failed: {0}")]
    GitError(String),

    /// A required external tool is not installed or not on PATH.
    #[error("External tool unavailable: {0}")]
    ToolUnavailable(String),

    /// Queue operation failed (unknown id, corrupt file, persistence error).
    #[error("Queue error: {0}")]
    QueueError(String),
}

impl GroveError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GroveError::UserError(_) => exit_codes::USER_ERROR,
            GroveError::ConfigError(_) => exit_codes::USER_ERROR,
            GroveError::StepError(_) => exit_codes::PIPELINE_FAILURE,
            GroveError::GateError(_) => exit_codes::PIPELINE_FAILURE,
            GroveError::GitError(_) => exit_codes::GIT_FAILURE,
            GroveError::ToolUnavailable(_) => exit_codes::USER_ERROR,
            GroveError::QueueError(_) => exit_codes::QUEUE_FAILURE,
        }
    }
}

/// Result type alias for grove operations.
pub type Result<T> = std::result::Result<T, GroveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_has_user_exit_code() {
        let err = GroveError::ConfigError("invalid cron expression '* *'".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn step_and_gate_errors_share_pipeline_exit_code() {
        let step = GroveError::StepError("npm update exited with 1".to_string());
        let gate = GroveError::GateError("1 required gate(s) failed".to_string());
        assert_eq!(step.exit_code(), exit_codes::PIPELINE_FAILURE);
        assert_eq!(gate.exit_code(), exit_codes::PIPELINE_FAILURE);
    }

    #[test]
    fn git_error_has_git_exit_code() {
        let err = GroveError::GitError("push rejected".to_string());
        assert_eq!(err.exit_code(), exit_codes::GIT_FAILURE);
    }

    #[test]
    fn queue_error_has_queue_exit_code() {
        let err = GroveError::QueueError("no queued task with id 'abc'".to_string());
        assert_eq!(err.exit_code(), exit_codes::QUEUE_FAILURE);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = GroveError::StepError("bump dependencies: exit code 2".to_string());
        assert_eq!(err.to_string(), "Step failed: bump dependencies: exit code 2");

        let err = GroveError::ToolUnavailable("gh".to_string());
        assert_eq!(err.to_string(), "External tool unavailable: gh");
    }
}
