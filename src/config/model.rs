//! AgentsConfig struct definition and defaults.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Contents of `.grove/agents.yaml`.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Global settings shared by all agent tasks.
    pub settings: AgentSettings,

    /// The configured agent tasks. Immutable for the duration of one
    /// scheduler run: the scheduler snapshots this list at start.
    pub agents: Vec<AgentTask>,
}

/// Global agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Coding-agent CLI binary invoked by `skill` steps.
    pub skill_command: String,

    /// Planning/execution CLI binary used by the alternate workflow.
    pub gsd_command: String,

    /// Remote that branches are pushed to.
    pub remote: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            skill_command: "claude".to_string(),
            gsd_command: "gsd".to_string(),
            remote: "origin".to_string(),
        }
    }
}

/// One scheduled maintenance task.
///
/// Read-only to the executor; every field is a snapshot for the duration of
/// one execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    /// Unique task name (referenced by queue entries).
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Cron schedule (5-field: minute hour day-of-month month day-of-week).
    pub schedule: String,

    /// Execution context.
    #[serde(default)]
    pub context: TaskContext,

    /// Ordered pipeline steps.
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Safety gates, git automation, rollback policy.
    #[serde(default)]
    pub safety: Safety,

    /// Notification channels per outcome.
    #[serde(default)]
    pub notifications: Notifications,

    /// Alternate workflow block. When present and enabled, the standard
    /// step/gate/git pipeline is bypassed entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsd: Option<GsdWorkflow>,
}

impl AgentTask {
    /// Whether this task uses the alternate planning workflow.
    pub fn uses_gsd_workflow(&self) -> bool {
        self.gsd.as_ref().is_some_and(|g| g.enabled)
    }
}
