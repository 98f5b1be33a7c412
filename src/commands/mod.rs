//! Command implementations for grove.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod agent;

use crate::cli::Command;
use crate::error::Result;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Each command
/// is routed to its handler function.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Agent(agent_cmd) => agent::dispatch(agent_cmd),
    }
}
