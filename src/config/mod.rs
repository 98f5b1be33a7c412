//! Agent task configuration for grove.
//!
//! The agent subsystem is configured declaratively in `.grove/agents.yaml`:
//! each entry describes one scheduled maintenance task (steps, safety gates,
//! git automation, notifications). This module is split into:
//!
//! - `model.rs`: the `AgentsConfig` / `AgentTask` structs
//! - `types.rs`: step, gate, git, and notification types with serde defaults
//! - `operations.rs`: loading, serialization, and validation

mod model;
mod operations;
#[cfg(test)]
mod tests;
mod types;

pub use model::{AgentSettings, AgentTask, AgentsConfig};
pub use types::{
    Gate, GitSettings, GsdWorkflow, Notifications, NotifyChannel, PushSettings,
    RollbackSettings, RollbackStrategy, Safety, Step, TaskContext,
};
