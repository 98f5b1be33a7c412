//! Agent task building blocks: steps, safety gates, git automation settings,
//! and notification channels.
//!
//! Step and notification kinds are closed tagged enums. An unrecognized
//! `kind` in the YAML is a load error, never a silent skip.

use serde::{Deserialize, Serialize};

/// One pipeline step. Steps run strictly in declared order and the first
/// failure aborts the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Run a shell command, inheriting the caller's output streams.
    Shell {
        /// Display name for log lines.
        name: String,
        /// Command line (shell-words parsed; no shell interpolation).
        command: String,
        /// Working directory relative to the execution root.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        working_dir: Option<String>,
    },
    /// Invoke the external coding-agent CLI with an instruction.
    Skill {
        /// Display name for log lines.
        name: String,
        /// Instruction text handed to the agent CLI.
        instruction: String,
    },
}

impl Step {
    /// Display name of the step.
    pub fn name(&self) -> &str {
        match self {
            Step::Shell { name, .. } => name,
            Step::Skill { name, .. } => name,
        }
    }
}

/// Execution context for a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskContext {
    /// Environment preset name (consumed by the workspace collaborator).
    pub preset: String,

    /// Base branch the task starts from and rolls back to.
    pub branch: String,

    /// Workspace instance number.
    pub instance: u32,

    /// Autonomous ("YOLO") mode: relax the agent CLI's permission prompts.
    pub yolo: bool,
}

impl Default for TaskContext {
    fn default() -> Self {
        Self {
            preset: String::new(),
            branch: default_base_branch(),
            instance: 1,
            yolo: false,
        }
    }
}

/// Safety configuration: gates, git automation, rollback policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Safety {
    /// Named shell checks run after the steps. All gates run to completion
    /// in one pass; only failing required gates fail the phase.
    pub gates: Vec<Gate>,

    /// Git commit/push/PR automation.
    pub git: GitSettings,

    /// Destructive recovery applied after a failed run.
    pub rollback: RollbackSettings,
}

/// A named shell check flagged required or optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub name: String,
    pub command: String,
    /// Required gates block the commit on failure; optional gates only warn.
    #[serde(default = "default_true")]
    pub required: bool,
}

/// Git automation settings. `{date}` in the branch name, commit message,
/// and PR title/body is substituted with the current date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    /// Target branch name.
    pub branch: String,

    /// Commit message.
    pub commit_message: String,

    /// Push and PR settings.
    pub push: PushSettings,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            branch: "grove/{date}".to_string(),
            commit_message: "chore: automated maintenance {date}".to_string(),
            push: PushSettings::default(),
        }
    }
}

/// Push and pull-request settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PushSettings {
    /// Master switch for the entire git phase.
    pub enabled: bool,

    /// Open a pull request after pushing.
    pub create_pr: bool,

    pub pr_title: String,
    pub pr_body: String,

    /// Enable auto-merge on the created PR (best-effort).
    pub auto_merge: bool,
}

/// Rollback policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RollbackSettings {
    pub enabled: bool,
    pub strategy: RollbackStrategy,
}

/// How a failed run is rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RollbackStrategy {
    /// Checkout the base branch, hard-reset to HEAD, remove untracked files.
    #[default]
    HardReset,
}

/// Notification channels, split by run outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Notifications {
    pub on_success: Vec<NotifyChannel>,
    pub on_failure: Vec<NotifyChannel>,
}

/// A notification channel. Only `webhook` delivers today; the other kinds
/// are accepted in config and report "not implemented" when dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifyChannel {
    /// Deliver a templated message to an outbound webhook.
    /// `{date}` and `{task}` in the template are substituted.
    Webhook {
        url: String,
        #[serde(default = "default_webhook_template")]
        template: String,
    },
    /// Placeholder: accepted but not implemented.
    Slack { channel: String },
    /// Placeholder: accepted but not implemented.
    Email { to: String },
}

impl NotifyChannel {
    /// Channel kind name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            NotifyChannel::Webhook { .. } => "webhook",
            NotifyChannel::Slack { .. } => "slack",
            NotifyChannel::Email { .. } => "email",
        }
    }
}

/// Alternate workflow block: bypass the step/gate/git pipeline and drive the
/// external planning CLI instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GsdWorkflow {
    pub enabled: bool,

    /// Run the plan after creating it, without operator confirmation.
    pub auto_execute: bool,
}

impl Default for GsdWorkflow {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_execute: false,
        }
    }
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_base_branch() -> String {
    "main".to_string()
}

fn default_webhook_template() -> String {
    "[grove] {task} finished on {date}".to_string()
}
