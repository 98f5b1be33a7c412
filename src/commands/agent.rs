//! Implementation of the `grove agent` commands.
//!
//! This module provides:
//! - `agent run` - Run one configured task immediately
//! - `agent list` - List configured tasks
//! - `agent daemon` - Run the cron scheduler in the foreground
//! - `agent queue` - Manage the durable task queue
//! - `agent process` - Drain the queue

use crate::cli::{
    AgentAction, AgentCommand, AgentRunArgs, ProcessArgs, QueueAction, QueueAddArgs,
    QueueCommand, QueueListArgs, QueueRemoveArgs,
};
use crate::config::AgentsConfig;
use crate::context::GroveContext;
use crate::error::{GroveError, Result};
use crate::executor::Executor;
use crate::queue::{drain_all, drain_one, TaskQueue, TaskStatus};
use crate::scheduler::Scheduler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Dispatch agent subcommands.
pub fn dispatch(agent_cmd: AgentCommand) -> Result<()> {
    match agent_cmd.action {
        AgentAction::Run(args) => cmd_run(args),
        AgentAction::List => cmd_list(),
        AgentAction::Daemon => cmd_daemon(),
        AgentAction::Queue(queue_cmd) => dispatch_queue(queue_cmd),
        AgentAction::Process(args) => cmd_process(args),
    }
}

fn dispatch_queue(queue_cmd: QueueCommand) -> Result<()> {
    match queue_cmd.action {
        QueueAction::Add(args) => cmd_queue_add(args),
        QueueAction::List(args) => cmd_queue_list(args),
        QueueAction::Remove(args) => cmd_queue_remove(args),
        QueueAction::Clear => cmd_queue_clear(),
    }
}

/// Load the agent config, with a worked example when the file is missing.
fn load_config(ctx: &GroveContext) -> Result<AgentsConfig> {
    let path = ctx.agents_config_path();
    if !path.exists() {
        return Err(GroveError::UserError(format!(
            "agent config not found at '{}'\n\n\
             Create an agents.yaml file to configure agent tasks.\n\n\
             Example agents.yaml:\n\
             agents:\n  \
               - name: npm-audit\n    \
                 schedule: \"0 3 * * 1\"\n    \
                 steps:\n      \
                   - kind: shell\n        \
                     name: audit\n        \
                     command: \"npm audit fix\"",
            path.display()
        )));
    }
    AgentsConfig::load(path)
}

/// Execute the `grove agent run` command.
pub fn cmd_run(args: AgentRunArgs) -> Result<()> {
    let ctx = GroveContext::resolve()?;
    let config = load_config(&ctx)?;

    let task = config.find_agent(&args.name).ok_or_else(|| {
        GroveError::UserError(format!(
            "no agent task named '{}'.\n\
             Configured tasks: {}",
            args.name,
            configured_names(&config)
        ))
    })?;

    let workdir = ctx.resolve_worktree(&args.worktree);
    println!("running '{}' in {}", task.name, workdir.display());

    let report = Executor::new(task, &config.settings, workdir).execute()?;

    println!();
    println!(
        "'{}' completed: {} step(s) executed",
        task.name, report.steps_executed
    );
    for sha in &report.commits {
        println!("  commit {}", sha);
    }
    if let Some(url) = &report.pr_url {
        println!("  pull request {}", url);
    }
    for warning in &report.warnings {
        println!("  warning: {}", warning);
    }
    Ok(())
}

/// Execute the `grove agent list` command.
pub fn cmd_list() -> Result<()> {
    let ctx = GroveContext::resolve()?;
    let config = load_config(&ctx)?;

    if config.agents.is_empty() {
        println!("No agent tasks configured.");
        return Ok(());
    }

    println!("Configured agent tasks ({}):", config.agents.len());
    println!();
    for task in &config.agents {
        println!("  {} [{}]", task.name, task.schedule);
        if !task.description.is_empty() {
            println!("    {}", task.description);
        }
        let workflow = if task.uses_gsd_workflow() {
            "alternate workflow".to_string()
        } else {
            format!(
                "{} step(s), {} gate(s), push {}",
                task.steps.len(),
                task.safety.gates.len(),
                if task.safety.git.push.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            )
        };
        println!("    {}", workflow);
    }
    Ok(())
}

/// Execute the `grove agent daemon` command.
///
/// Blocks in the foreground until interrupted.
pub fn cmd_daemon() -> Result<()> {
    let ctx = GroveContext::resolve()?;
    let config = load_config(&ctx)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        eprintln!("interrupt received, shutting down");
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| GroveError::UserError(format!("failed to install signal handler: {}", e)))?;

    let mut scheduler = Scheduler::new(ctx, config);
    scheduler.start(shutdown)
}

fn cmd_queue_add(args: QueueAddArgs) -> Result<()> {
    let ctx = GroveContext::resolve()?;
    let config = load_config(&ctx)?;

    // Catch typos at enqueue time; the definition is resolved again at
    // drain time and may have changed by then.
    if config.find_agent(&args.name).is_none() {
        return Err(GroveError::UserError(format!(
            "no agent task named '{}'.\n\
             Configured tasks: {}",
            args.name,
            configured_names(&config)
        )));
    }

    let queue = TaskQueue::open(ctx.queue_path())?;
    let entry = queue.add(&args.name, &args.worktree)?;
    println!("queued '{}' as {}", entry.agent_name, entry.id);
    Ok(())
}

fn cmd_queue_list(args: QueueListArgs) -> Result<()> {
    let ctx = GroveContext::resolve()?;
    let queue = TaskQueue::open(ctx.queue_path())?;

    let filter = args
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()?;
    let entries = queue.list(filter);

    if entries.is_empty() {
        println!("Queue is empty.");
        return Ok(());
    }

    println!("Queue entries ({}):", entries.len());
    println!();
    for entry in &entries {
        println!("  {} {} [{}]", entry.id, entry.agent_name, entry.status);
        println!(
            "    created {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        if !entry.worktree.is_empty() {
            println!("    worktree {}", entry.worktree);
        }
        if let Some(duration) = entry.duration_ms {
            println!("    took {}ms", duration);
        }
        if let Some(error) = &entry.error {
            println!("    error: {}", error);
        }
    }
    Ok(())
}

fn cmd_queue_remove(args: QueueRemoveArgs) -> Result<()> {
    let ctx = GroveContext::resolve()?;
    let queue = TaskQueue::open(ctx.queue_path())?;
    let removed = queue.remove(&args.id)?;
    println!("removed '{}' ({})", removed.agent_name, removed.id);
    Ok(())
}

fn cmd_queue_clear() -> Result<()> {
    let ctx = GroveContext::resolve()?;
    let queue = TaskQueue::open(ctx.queue_path())?;
    let removed = queue.clear()?;
    println!(
        "cleared {} finished entr{}",
        removed,
        if removed == 1 { "y" } else { "ies" }
    );
    Ok(())
}

/// Execute the `grove agent process` command.
pub fn cmd_process(args: ProcessArgs) -> Result<()> {
    let ctx = GroveContext::resolve()?;
    let config = load_config(&ctx)?;
    let queue = TaskQueue::open(ctx.queue_path())?;

    if args.all {
        let summary = drain_all(&ctx, &config, &queue)?;
        println!(
            "queue drained: {} processed, {} failed",
            summary.processed, summary.failed
        );
        Ok(())
    } else {
        drain_one(&ctx, &config, &queue)?;
        Ok(())
    }
}

fn configured_names(config: &AgentsConfig) -> String {
    if config.agents.is_empty() {
        "(none)".to_string()
    } else {
        config
            .agents
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_repo, DirGuard};
    use serial_test::serial;

    const CONFIG: &str = r#"
agents:
  - name: npm-audit
    schedule: "0 3 * * 1"
    steps:
      - kind: shell
        name: ok
        command: "true"
"#;

    fn write_config(repo: &tempfile::TempDir) {
        let state_dir = repo.path().join(".grove");
        std::fs::create_dir_all(&state_dir).unwrap();
        std::fs::write(state_dir.join("agents.yaml"), CONFIG).unwrap();
    }

    #[test]
    #[serial]
    fn queue_add_rejects_unknown_task_names() {
        let repo = create_test_repo();
        write_config(&repo);
        let _guard = DirGuard::new(repo.path());

        let result = cmd_queue_add(QueueAddArgs {
            name: "no-such-task".to_string(),
            worktree: String::new(),
        });
        let err = result.unwrap_err();
        assert!(matches!(err, GroveError::UserError(_)));
        assert!(err.to_string().contains("npm-audit"));
    }

    #[test]
    #[serial]
    fn queue_add_then_process_completes_the_entry() {
        let repo = create_test_repo();
        write_config(&repo);
        let _guard = DirGuard::new(repo.path());

        cmd_queue_add(QueueAddArgs {
            name: "npm-audit".to_string(),
            worktree: String::new(),
        })
        .unwrap();
        cmd_process(ProcessArgs { all: false }).unwrap();

        let ctx = GroveContext::resolve().unwrap();
        let queue = TaskQueue::open(ctx.queue_path()).unwrap();
        assert_eq!(queue.count(Some(TaskStatus::Completed)), 1);
        assert_eq!(queue.count(Some(TaskStatus::Pending)), 0);
    }

    #[test]
    #[serial]
    fn missing_config_is_a_user_error_with_an_example() {
        let repo = create_test_repo();
        let _guard = DirGuard::new(repo.path());

        let err = cmd_list().unwrap_err();
        assert!(matches!(err, GroveError::UserError(_)));
        assert!(err.to_string().contains("agents.yaml"));
    }

    #[test]
    #[serial]
    fn run_with_unknown_name_lists_configured_tasks() {
        let repo = create_test_repo();
        write_config(&repo);
        let _guard = DirGuard::new(repo.path());

        let err = cmd_run(AgentRunArgs {
            name: "typo".to_string(),
            worktree: String::new(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("npm-audit"));
    }
}
