//! Safety gate evaluation.
//!
//! Unlike steps, all gates run to completion in one pass regardless of
//! individual failures, so every gate's outcome is visible together. The
//! phase fails only if at least one required gate failed; failing optional
//! gates are recorded as warnings.

use super::{ExecutionReport, Executor};
use crate::config::Gate;
use crate::error::{GroveError, Result};
use std::process::Command;

/// Maximum length of the failing-output excerpt shown per gate.
const OUTPUT_EXCERPT_LEN: usize = 400;

/// Result of evaluating one gate.
#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub name: String,
    pub required: bool,
    pub passed: bool,
    /// Capped excerpt of combined output; populated only on failure.
    pub excerpt: String,
}

impl Executor<'_> {
    pub(super) fn run_gates(&self, report: &mut ExecutionReport) -> Result<()> {
        if self.task.safety.gates.is_empty() {
            return Ok(());
        }

        let outcomes = self.evaluate_gates(&self.task.safety.gates);

        for outcome in &outcomes {
            if outcome.passed {
                println!("gate '{}': ok", outcome.name);
            } else if outcome.required {
                println!("gate '{}': FAILED (required)", outcome.name);
                if !outcome.excerpt.is_empty() {
                    println!("{}", outcome.excerpt);
                }
            } else {
                println!("gate '{}': failed (optional, continuing)", outcome.name);
                report
                    .warnings
                    .push(format!("optional gate '{}' failed", outcome.name));
            }
        }

        let failed_required: Vec<&str> = outcomes
            .iter()
            .filter(|o| !o.passed && o.required)
            .map(|o| o.name.as_str())
            .collect();

        if failed_required.is_empty() {
            Ok(())
        } else {
            Err(GroveError::GateError(format!(
                "{} required gate(s) failed: {}",
                failed_required.len(),
                failed_required.join(", ")
            )))
        }
    }

    /// Run every gate and collect the outcomes. Never short-circuits.
    pub(super) fn evaluate_gates(&self, gates: &[Gate]) -> Vec<GateOutcome> {
        gates.iter().map(|gate| self.evaluate_gate(gate)).collect()
    }

    fn evaluate_gate(&self, gate: &Gate) -> GateOutcome {
        let failed = |excerpt: String| GateOutcome {
            name: gate.name.clone(),
            required: gate.required,
            passed: false,
            excerpt,
        };

        let args = match shell_words::split(&gate.command) {
            Ok(args) if !args.is_empty() => args,
            Ok(_) => return failed("gate command is empty".to_string()),
            Err(e) => return failed(format!("failed to parse gate command: {}", e)),
        };

        match Command::new(&args[0])
            .args(&args[1..])
            .current_dir(&self.workdir)
            .output()
        {
            Ok(output) if output.status.success() => GateOutcome {
                name: gate.name.clone(),
                required: gate.required,
                passed: true,
                excerpt: String::new(),
            },
            Ok(output) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                failed(excerpt_of(combined.trim()))
            }
            Err(e) => failed(format!("failed to execute '{}': {}", args[0], e)),
        }
    }
}

fn excerpt_of(output: &str) -> String {
    if output.len() <= OUTPUT_EXCERPT_LEN {
        output.to_string()
    } else {
        let cut = output
            .char_indices()
            .take_while(|(i, _)| *i < OUTPUT_EXCERPT_LEN)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}... (truncated)", &output[..cut])
    }
}
