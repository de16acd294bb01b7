/// End-to-end tests for config file discovery and precedence
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const CONFIG_FILENAME: &str = "image-lifecycle.config.yml";

fn cmd_in(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("image-lifecycle");
    cmd.current_dir(dir.path())
        .env_remove("IMAGE_LIFECYCLE_DATABASE")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_auto_discovered_config_sets_database() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILENAME),
        "database_path: from-config.db\n",
    )
    .unwrap();

    cmd_in(&dir)
        .args(["request-build", "--tenant", "acme"])
        .assert()
        .success();

    assert!(dir.path().join("from-config.db").exists());
    assert!(!dir.path().join("image-lifecycle.db").exists());
}

#[test]
fn test_explicit_config_path() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("custom.yml");
    fs::write(&config_path, "database_path: custom.db\nformat: markdown\n").unwrap();

    cmd_in(&dir)
        .arg("--config")
        .arg(&config_path)
        .args(["list-builds", "--tenant", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Build Events"));

    assert!(dir.path().join("custom.db").exists());
}

#[test]
fn test_format_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILENAME), "format: markdown\n").unwrap();

    let output = cmd_in(&dir)
        .args(["--format", "json", "customers", "list"])
        .output()
        .unwrap();

    assert!(stdout_json(&output).as_array().unwrap().is_empty());
}

#[test]
fn test_config_actor_recorded_in_audit() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILENAME), "actor: deploy-bot\n").unwrap();

    cmd_in(&dir)
        .args(["request-build", "--tenant", "acme"])
        .assert()
        .success();

    let output = cmd_in(&dir)
        .args(["audit", "list", "--tenant", "acme"])
        .output()
        .unwrap();
    let entries = stdout_json(&output);
    assert_eq!(entries[0]["actor"], "deploy-bot");
}

#[test]
fn test_missing_explicit_config_exit_code() {
    let dir = TempDir::new().unwrap();

    cmd_in(&dir)
        .args(["--config", "nowhere.yml", "customers", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_invalid_yaml_exit_code() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILENAME), "database_path: [unterminated\n").unwrap();

    cmd_in(&dir)
        .args(["customers", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_invalid_endpoint_exit_code() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILENAME),
        "orchestrator:\n  endpoint: ftp://builder.internal\n",
    )
    .unwrap();

    cmd_in(&dir)
        .args(["customers", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("orchestrator.endpoint"));
}

#[test]
fn test_unknown_field_warns_and_continues() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILENAME),
        "database_path: state.db\nretention_days: 30\n",
    )
    .unwrap();

    cmd_in(&dir)
        .args(["customers", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown config field 'retention_days'"));
}

#[test]
fn test_database_env_overrides_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILENAME),
        "database_path: from-config.db\n",
    )
    .unwrap();

    cmd_in(&dir)
        .env("IMAGE_LIFECYCLE_DATABASE", "from-env.db")
        .args(["request-build", "--tenant", "acme"])
        .assert()
        .success();

    assert!(dir.path().join("from-env.db").exists());
    assert!(!dir.path().join("from-config.db").exists());
}

#[test]
fn test_database_flag_overrides_env() {
    let dir = TempDir::new().unwrap();

    cmd_in(&dir)
        .env("IMAGE_LIFECYCLE_DATABASE", "from-env.db")
        .args(["--database", "from-flag.db", "request-build", "--tenant", "acme"])
        .assert()
        .success();

    assert!(dir.path().join("from-flag.db").exists());
    assert!(!dir.path().join("from-env.db").exists());
}
