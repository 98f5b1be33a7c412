//! Queue drain: bridges the queue to the executor.
//!
//! Single-task mode claims the first pending entry, runs it, and records the
//! result in both the queue and the execution history. Continuous mode
//! repeats until nothing is pending; one failing task never stops the loop,
//! but the loop as a whole reports failure if anything failed.

use super::{QueuedTask, TaskQueue, TaskStatus};
use crate::config::AgentsConfig;
use crate::context::GroveContext;
use crate::error::{GroveError, Result};
use crate::executor::{ExecutionReport, Executor};
use crate::history::{ExecutionHistory, ExecutionRecord};
use chrono::Utc;
use std::thread;
use std::time::Duration;

/// Pause between continuous-mode iterations, so external side effects of the
/// previous task (containers, file watchers) get a moment to settle.
const DRAIN_PAUSE: Duration = Duration::from_secs(2);

/// Result of one single-task drain pass.
#[derive(Debug)]
pub enum DrainOutcome {
    /// Nothing was pending.
    Idle,
    /// One entry ran to completion.
    Completed(QueuedTask),
    /// One entry was attempted and failed.
    Failed(QueuedTask),
}

/// Counters accumulated by continuous mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct DrainSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Claim and execute the first pending queue entry, if any.
///
/// An empty queue is a success. An entry whose task definition no longer
/// exists in the config is marked failed immediately, without ever entering
/// running.
pub fn drain_one(
    ctx: &GroveContext,
    config: &AgentsConfig,
    queue: &TaskQueue,
) -> Result<DrainOutcome> {
    let Some(entry) = queue.next() else {
        println!("queue: nothing pending");
        return Ok(DrainOutcome::Idle);
    };

    let Some(task) = config.find_agent(&entry.agent_name) else {
        let error = format!("no agent task named '{}' in the config", entry.agent_name);
        let failed = queue.update_status(&entry.id, TaskStatus::Failed, Some(&error))?;
        record_history(ctx, &failed, None);
        return Ok(DrainOutcome::Failed(failed));
    };

    let claimed = queue.update_status(&entry.id, TaskStatus::Running, None)?;
    println!(
        "queue: running '{}' (worktree '{}')",
        claimed.agent_name, claimed.worktree
    );

    let workdir = ctx.resolve_worktree(&claimed.worktree);
    let executor = Executor::new(task, &config.settings, workdir);

    match executor.execute() {
        Ok(report) => {
            let done = queue.update_status(&claimed.id, TaskStatus::Completed, None)?;
            record_history(ctx, &done, Some(&report));
            Ok(DrainOutcome::Completed(done))
        }
        Err(e) => {
            let message = e.to_string();
            let done = queue.update_status(&claimed.id, TaskStatus::Failed, Some(&message))?;
            record_history(ctx, &done, None);
            Ok(DrainOutcome::Failed(done))
        }
    }
}

/// Drain pending entries until none remain.
///
/// Returns the summary on full success; returns a queue error carrying the
/// final counters if any entry failed, so the caller exits non-zero even
/// though the queue was fully drained.
pub fn drain_all(
    ctx: &GroveContext,
    config: &AgentsConfig,
    queue: &TaskQueue,
) -> Result<DrainSummary> {
    let mut summary = DrainSummary::default();

    while queue.count(Some(TaskStatus::Pending)) > 0 {
        match drain_one(ctx, config, queue)? {
            DrainOutcome::Idle => break,
            DrainOutcome::Completed(_) => summary.processed += 1,
            DrainOutcome::Failed(_) => summary.failed += 1,
        }

        println!(
            "queue: {} processed, {} failed, {} pending",
            summary.processed,
            summary.failed,
            queue.count(Some(TaskStatus::Pending))
        );

        if queue.count(Some(TaskStatus::Pending)) > 0 {
            thread::sleep(DRAIN_PAUSE);
        }
    }

    if summary.failed > 0 {
        Err(GroveError::QueueError(format!(
            "drained the queue with {} failure(s) ({} processed)",
            summary.failed, summary.processed
        )))
    } else {
        Ok(summary)
    }
}

/// Best-effort history append; a history write problem is logged, never
/// escalated past the queue-status update that already happened.
fn record_history(ctx: &GroveContext, entry: &QueuedTask, report: Option<&ExecutionReport>) {
    let now = Utc::now();
    let start = entry.started_at.unwrap_or(entry.created_at);
    let end = entry.completed_at.unwrap_or(now);

    let record = ExecutionRecord {
        id: entry.id.clone(),
        agent_name: entry.agent_name.clone(),
        worktree: entry.worktree.clone(),
        status: entry.status,
        start_time: start,
        end_time: end,
        duration_ms: entry.duration_ms.unwrap_or(0),
        error: entry.error.clone(),
        steps_executed: report.map(|r| r.steps_executed),
        commits: report.map(|r| r.commits.clone()).filter(|c| !c.is_empty()),
        pr_url: report.and_then(|r| r.pr_url.clone()),
    };

    let history = ExecutionHistory::new(ctx.history_path());
    if let Err(e) = history.append(record) {
        eprintln!("warning: failed to record execution history: {}", e);
    }
}

#[cfg(test)]
mod drain_tests {
    use super::*;
    use crate::test_support::create_test_repo;

    const CONFIG: &str = r#"
settings:
  skill_command: claude
agents:
  - name: good
    schedule: "0 3 * * *"
    steps:
      - kind: shell
        name: ok
        command: "true"
  - name: bad
    schedule: "0 3 * * *"
    steps:
      - kind: shell
        name: boom
        command: "false"
"#;

    fn setup(repo: &tempfile::TempDir) -> (GroveContext, AgentsConfig, TaskQueue) {
        let ctx = GroveContext::resolve_from(repo.path()).unwrap();
        let config = AgentsConfig::from_yaml(CONFIG).unwrap();
        let queue = TaskQueue::open(ctx.queue_path()).unwrap();
        (ctx, config, queue)
    }

    #[test]
    fn empty_queue_is_a_success() {
        let repo = create_test_repo();
        let (ctx, config, queue) = setup(&repo);

        let outcome = drain_one(&ctx, &config, &queue).unwrap();
        assert!(matches!(outcome, DrainOutcome::Idle));
    }

    #[test]
    fn unknown_definition_fails_without_running() {
        let repo = create_test_repo();
        let (ctx, config, queue) = setup(&repo);
        let entry = queue.add("no-such-task", "").unwrap();

        let outcome = drain_one(&ctx, &config, &queue).unwrap();
        let DrainOutcome::Failed(failed) = outcome else {
            panic!("expected a failed outcome");
        };
        assert_eq!(failed.id, entry.id);
        assert!(failed.started_at.is_none(), "must never enter running");
        assert!(failed.error.as_deref().unwrap().contains("no-such-task"));
    }

    #[test]
    fn successful_entry_completes_and_records_history() {
        let repo = create_test_repo();
        let (ctx, config, queue) = setup(&repo);
        queue.add("good", "").unwrap();

        let outcome = drain_one(&ctx, &config, &queue).unwrap();
        assert!(matches!(outcome, DrainOutcome::Completed(_)));
        assert_eq!(queue.count(Some(TaskStatus::Completed)), 1);

        let records = ExecutionHistory::new(ctx.history_path()).load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].agent_name, "good");
        assert_eq!(records[0].steps_executed, Some(1));
    }

    #[test]
    fn continuous_mode_drains_everything_and_reports_failures() {
        let repo = create_test_repo();
        let (ctx, config, queue) = setup(&repo);
        queue.add("good", "").unwrap();
        queue.add("bad", "").unwrap();
        queue.add("good", "").unwrap();

        let err = drain_all(&ctx, &config, &queue).unwrap_err();
        assert!(matches!(err, GroveError::QueueError(_)));
        assert!(err.to_string().contains("1 failure"));
        assert!(err.to_string().contains("2 processed"));

        assert_eq!(queue.count(Some(TaskStatus::Pending)), 0);
        assert_eq!(queue.count(Some(TaskStatus::Completed)), 2);
        assert_eq!(queue.count(Some(TaskStatus::Failed)), 1);
    }

    #[test]
    fn continuous_mode_succeeds_when_everything_passes() {
        let repo = create_test_repo();
        let (ctx, config, queue) = setup(&repo);
        queue.add("good", "").unwrap();
        queue.add("good", "").unwrap();

        let summary = drain_all(&ctx, &config, &queue).unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 0);
    }
}
