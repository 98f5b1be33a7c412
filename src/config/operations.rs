//! Config loading, validation, and lookup operations.

use super::model::{AgentTask, AgentsConfig};
use crate::error::{GroveError, Result};
use std::collections::BTreeSet;
use std::path::Path;

impl AgentsConfig {
    /// Load the agent configuration from a YAML file.
    ///
    /// Unknown fields are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            GroveError::UserError(format!(
                "failed to read agent config '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse the agent configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AgentsConfig = serde_yaml::from_str(yaml)
            .map_err(|e| GroveError::ConfigError(format!("failed to parse agents YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GroveError::ConfigError(format!("failed to serialize agents YAML: {}", e)))
    }

    /// Validate structural rules that apply to every task.
    ///
    /// Cron expressions are deliberately NOT validated here: an invalid
    /// schedule fails only that task's registration in the scheduler, so
    /// sibling tasks still load and run.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();

        for task in &self.agents {
            if task.name.is_empty() {
                return Err(GroveError::ConfigError(
                    "agent task with empty name".to_string(),
                ));
            }
            if !seen.insert(task.name.as_str()) {
                return Err(GroveError::ConfigError(format!(
                    "duplicate agent task name '{}'",
                    task.name
                )));
            }
            if task.schedule.trim().is_empty() {
                return Err(GroveError::ConfigError(format!(
                    "agent task '{}' has an empty schedule",
                    task.name
                )));
            }
            if task.steps.is_empty() && !task.uses_gsd_workflow() {
                return Err(GroveError::ConfigError(format!(
                    "agent task '{}' has no steps and no alternate workflow",
                    task.name
                )));
            }
            for gate in &task.safety.gates {
                if gate.command.trim().is_empty() {
                    return Err(GroveError::ConfigError(format!(
                        "agent task '{}' gate '{}' has an empty command",
                        task.name, gate.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Look up a task definition by name.
    pub fn find_agent(&self, name: &str) -> Option<&AgentTask> {
        self.agents.iter().find(|a| a.name == name)
    }
}
