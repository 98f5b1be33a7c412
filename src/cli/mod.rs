//! CLI argument parsing for grove.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};

/// Grove: scheduled maintenance agents for multi-project dev workspaces.
///
/// Agent tasks are defined in `.grove/agents.yaml` and run through a fixed
/// pipeline: steps, safety gates, git commit/push/PR, notifications. They
/// can fire on a cron schedule (`agent daemon`), or be queued and drained
/// on demand (`agent queue`, `agent process`).
#[derive(Parser, Debug)]
#[command(name = "grove")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for grove.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Agent automation commands.
    ///
    /// Run, schedule, and queue the maintenance tasks configured in
    /// `.grove/agents.yaml`.
    Agent(AgentCommand),
}

/// Agent subcommands.
#[derive(Parser, Debug)]
pub struct AgentCommand {
    #[command(subcommand)]
    pub action: AgentAction,
}

/// Available agent actions.
#[derive(Subcommand, Debug)]
pub enum AgentAction {
    /// Run one configured agent task immediately.
    ///
    /// Bypasses both the scheduler and the queue; the task's full
    /// pipeline still applies.
    Run(AgentRunArgs),

    /// List configured agent tasks and their schedules.
    List,

    /// Run the scheduler daemon in the foreground.
    ///
    /// Registers a cron timer per task and blocks until interrupted.
    /// Activity is logged to `.grove/agent.log`.
    Daemon,

    /// Durable task queue commands.
    Queue(QueueCommand),

    /// Drain the queue: claim and execute pending entries.
    Process(ProcessArgs),
}

/// Arguments for the `agent run` command.
#[derive(Parser, Debug)]
pub struct AgentRunArgs {
    /// Name of the agent task to run.
    pub name: String,

    /// Worktree to run in. Defaults to the primary checkout.
    #[arg(long, default_value = "")]
    pub worktree: String,
}

/// Queue subcommands.
#[derive(Parser, Debug)]
pub struct QueueCommand {
    #[command(subcommand)]
    pub action: QueueAction,
}

/// Available queue actions.
#[derive(Subcommand, Debug)]
pub enum QueueAction {
    /// Enqueue an agent task for later execution.
    Add(QueueAddArgs),

    /// List queue entries.
    List(QueueListArgs),

    /// Remove one queue entry by id.
    Remove(QueueRemoveArgs),

    /// Remove every completed or failed entry.
    ///
    /// Pending and running entries are kept untouched.
    Clear,
}

/// Arguments for the `agent queue add` command.
#[derive(Parser, Debug)]
pub struct QueueAddArgs {
    /// Name of the agent task to enqueue.
    pub name: String,

    /// Worktree to run in. Defaults to the primary checkout.
    #[arg(long, default_value = "")]
    pub worktree: String,
}

/// Arguments for the `agent queue list` command.
#[derive(Parser, Debug)]
pub struct QueueListArgs {
    /// Only show entries with this status
    /// (pending, running, completed, failed).
    #[arg(long)]
    pub status: Option<String>,
}

/// Arguments for the `agent queue remove` command.
#[derive(Parser, Debug)]
pub struct QueueRemoveArgs {
    /// Id of the queue entry to remove.
    pub id: String,
}

/// Arguments for the `agent process` command.
#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// Keep draining until nothing is pending, instead of processing
    /// a single entry.
    #[arg(long)]
    pub all: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
