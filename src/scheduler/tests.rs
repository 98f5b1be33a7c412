use super::*;
use crate::test_support::create_test_repo;

#[test]
fn five_field_expressions_fire_at_the_top_of_the_minute() {
    let schedule = parse_schedule("30 3 * * *").unwrap();
    let next = schedule.upcoming(Utc).next().unwrap();
    assert_eq!(next.format("%H:%M:%S").to_string(), "03:30:00");
}

#[test]
fn six_field_expressions_pass_through() {
    assert!(parse_schedule("*/5 * * * * *").is_ok());
}

#[test]
fn invalid_expression_is_a_config_error() {
    let err = parse_schedule("not a cron").unwrap_err();
    assert!(matches!(err, GroveError::ConfigError(_)));
    assert!(err.to_string().contains("not a cron"));
}

#[test]
fn trigger_times_passed_during_a_long_job_count_as_skipped() {
    use chrono::TimeZone;

    let schedule = parse_schedule("* * * * * *").unwrap();
    let fired = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

    let missed = missed_ticks(&schedule, fired, fired + chrono::Duration::seconds(3));
    assert_eq!(missed.len(), 3);
    assert_eq!(missed[0], fired + chrono::Duration::seconds(1));

    // A job that returns before the next trigger skips nothing.
    assert!(missed_ticks(&schedule, fired, fired).is_empty());
}

#[test]
fn long_job_logs_a_skip_notice_for_each_missed_tick() {
    let repo = create_test_repo();
    let ctx = GroveContext::resolve_from(repo.path()).unwrap();
    let config = AgentsConfig::from_yaml(
        r#"
agents:
  - name: slow
    schedule: "* * * * * *"
    steps:
      - kind: shell
        name: nap
        command: "sleep 2"
"#,
    )
    .unwrap();

    let mut scheduler = Scheduler::new(ctx, config);
    let shutdown = Arc::new(AtomicBool::new(false));
    assert_eq!(scheduler.register_tasks(&shutdown), 1);

    // The first tick fires within a second and the job body sleeps through
    // at least one later trigger time.
    thread::sleep(Duration::from_millis(4500));
    shutdown.store(true, Ordering::SeqCst);
    // Give the timer thread a poll interval to notice the flag and exit.
    thread::sleep(Duration::from_millis(700));

    let log = std::fs::read_to_string(scheduler.ctx.agent_log_path()).unwrap();
    assert!(log.contains("task 'slow' started"));
    assert!(
        log.contains("still running at") && log.contains("tick skipped"),
        "expected a skip notice per missed trigger, got:\n{}",
        log
    );
}

#[test]
fn invalid_schedule_fails_only_that_registration() {
    let repo = create_test_repo();
    let ctx = GroveContext::resolve_from(repo.path()).unwrap();
    let config = AgentsConfig::from_yaml(
        r#"
agents:
  - name: good
    schedule: "0 3 * * *"
    steps:
      - kind: shell
        name: ok
        command: "true"
  - name: broken
    schedule: "banana"
    steps:
      - kind: shell
        name: ok
        command: "true"
"#,
    )
    .unwrap();

    let mut scheduler = Scheduler::new(ctx, config);
    let shutdown = Arc::new(AtomicBool::new(true));
    let registered = scheduler.register_tasks(&shutdown);
    assert_eq!(registered, 1);
}

#[test]
fn start_blocks_until_shutdown_then_stops() {
    let repo = create_test_repo();
    let ctx = GroveContext::resolve_from(repo.path()).unwrap();
    // Fires once a year at most; the timer just sleeps until shutdown.
    let config = AgentsConfig::from_yaml(
        r#"
agents:
  - name: rare
    schedule: "0 0 1 1 *"
    steps:
      - kind: shell
        name: ok
        command: "true"
"#,
    )
    .unwrap();

    let mut scheduler = Scheduler::new(ctx, config);
    let shutdown = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&shutdown);
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        flag.store(true, Ordering::SeqCst);
    });

    scheduler.start(shutdown).unwrap();
    stopper.join().unwrap();

    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert!(scheduler.start(Arc::new(AtomicBool::new(true))).is_err());

    let log = std::fs::read_to_string(scheduler.ctx.agent_log_path()).unwrap();
    assert!(log.contains("daemon started"));
    assert!(log.contains("daemon stopped"));
}
