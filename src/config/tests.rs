//! Tests for agent configuration parsing and validation.

use super::*;

const FULL_CONFIG: &str = r##"
settings:
  skill_command: claude
  remote: origin
agents:
  - name: npm-audit
    description: Weekly dependency audit
    schedule: "0 3 * * 1"
    context:
      preset: node
      branch: main
      instance: 2
      yolo: true
    steps:
      - kind: shell
        name: audit
        command: npm audit fix
        working_dir: web
      - kind: skill
        name: review
        instruction: Review the audit changes and fix any breakage
    safety:
      gates:
        - name: tests
          command: npm test
        - name: lint
          command: npm run lint
          required: false
      git:
        branch: "chore/audit-{date}"
        commit_message: "chore: npm audit {date}"
        push:
          enabled: true
          create_pr: true
          pr_title: "Automated audit {date}"
          pr_body: "Weekly npm audit run."
      rollback:
        enabled: true
        strategy: hard_reset
    notifications:
      on_success:
        - kind: webhook
          url: https://hooks.example.com/grove
      on_failure:
        - kind: webhook
          url: https://hooks.example.com/grove
          template: "[grove] {task} FAILED on {date}"
        - kind: slack
          channel: "#alerts"
"##;

#[test]
fn parses_full_config() {
    let config = AgentsConfig::from_yaml(FULL_CONFIG).unwrap();
    assert_eq!(config.agents.len(), 1);

    let task = &config.agents[0];
    assert_eq!(task.name, "npm-audit");
    assert_eq!(task.schedule, "0 3 * * 1");
    assert_eq!(task.context.preset, "node");
    assert_eq!(task.context.instance, 2);
    assert!(task.context.yolo);
    assert_eq!(task.steps.len(), 2);
    assert!(task.safety.git.push.enabled);
    assert!(task.safety.rollback.enabled);
    assert_eq!(task.notifications.on_failure.len(), 2);
    assert!(!task.uses_gsd_workflow());
}

#[test]
fn step_kinds_deserialize_as_tagged_variants() {
    let config = AgentsConfig::from_yaml(FULL_CONFIG).unwrap();
    let task = &config.agents[0];

    match &task.steps[0] {
        Step::Shell {
            name,
            command,
            working_dir,
        } => {
            assert_eq!(name, "audit");
            assert_eq!(command, "npm audit fix");
            assert_eq!(working_dir.as_deref(), Some("web"));
        }
        other => panic!("expected shell step, got {:?}", other),
    }

    match &task.steps[1] {
        Step::Skill { name, instruction } => {
            assert_eq!(name, "review");
            assert!(instruction.contains("audit"));
        }
        other => panic!("expected skill step, got {:?}", other),
    }
}

#[test]
fn unknown_step_kind_is_a_load_error() {
    let yaml = r#"
agents:
  - name: bad
    schedule: "* * * * *"
    steps:
      - kind: teleport
        name: nope
        command: true
"#;
    let result = AgentsConfig::from_yaml(yaml);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("agents YAML"));
}

#[test]
fn gate_required_defaults_to_true() {
    let config = AgentsConfig::from_yaml(FULL_CONFIG).unwrap();
    let gates = &config.agents[0].safety.gates;
    assert!(gates[0].required);
    assert!(!gates[1].required);
}

#[test]
fn defaults_fill_missing_sections() {
    let yaml = r#"
agents:
  - name: minimal
    schedule: "0 4 * * *"
    steps:
      - kind: shell
        name: noop
        command: "true"
"#;
    let config = AgentsConfig::from_yaml(yaml).unwrap();
    let task = &config.agents[0];

    assert_eq!(task.context.branch, "main");
    assert_eq!(task.context.instance, 1);
    assert!(!task.context.yolo);
    assert!(task.safety.gates.is_empty());
    assert!(!task.safety.git.push.enabled);
    assert!(!task.safety.rollback.enabled);
    assert!(task.notifications.on_success.is_empty());
    assert_eq!(config.settings.skill_command, "claude");
    assert_eq!(config.settings.remote, "origin");
}

#[test]
fn gsd_block_enables_alternate_workflow() {
    let yaml = r#"
agents:
  - name: planner
    schedule: "0 6 * * *"
    gsd:
      enabled: true
      auto_execute: true
"#;
    let config = AgentsConfig::from_yaml(yaml).unwrap();
    let task = &config.agents[0];
    assert!(task.uses_gsd_workflow());
    assert!(task.gsd.as_ref().unwrap().auto_execute);
}

#[test]
fn duplicate_names_rejected() {
    let yaml = r#"
agents:
  - name: twin
    schedule: "* * * * *"
    steps: [{kind: shell, name: a, command: "true"}]
  - name: twin
    schedule: "* * * * *"
    steps: [{kind: shell, name: b, command: "true"}]
"#;
    let err = AgentsConfig::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate agent task name"));
}

#[test]
fn task_without_steps_or_gsd_rejected() {
    let yaml = r#"
agents:
  - name: hollow
    schedule: "* * * * *"
"#;
    let err = AgentsConfig::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("no steps"));
}

#[test]
fn empty_gate_command_rejected() {
    let yaml = r#"
agents:
  - name: gated
    schedule: "* * * * *"
    steps: [{kind: shell, name: a, command: "true"}]
    safety:
      gates:
        - name: hollow-gate
          command: "  "
"#;
    let err = AgentsConfig::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("empty command"));
}

#[test]
fn invalid_cron_is_not_a_load_error() {
    // Registration errors are per-task and belong to the scheduler; a config
    // with a nonsense schedule string still loads.
    let yaml = r#"
agents:
  - name: odd
    schedule: "every other blue moon"
    steps: [{kind: shell, name: a, command: "true"}]
"#;
    assert!(AgentsConfig::from_yaml(yaml).is_ok());
}

#[test]
fn find_agent_by_name() {
    let config = AgentsConfig::from_yaml(FULL_CONFIG).unwrap();
    assert!(config.find_agent("npm-audit").is_some());
    assert!(config.find_agent("nope").is_none());
}

#[test]
fn config_round_trips_through_yaml() {
    let config = AgentsConfig::from_yaml(FULL_CONFIG).unwrap();
    let yaml = config.to_yaml().unwrap();
    let reparsed = AgentsConfig::from_yaml(&yaml).unwrap();

    assert_eq!(reparsed.agents.len(), config.agents.len());
    assert_eq!(reparsed.agents[0].name, config.agents[0].name);
    assert_eq!(
        reparsed.agents[0].safety.gates.len(),
        config.agents[0].safety.gates.len()
    );
}
