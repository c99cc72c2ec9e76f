//! End-to-end tests of the `society-console` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use super::common::backend::StubBackend;

fn console(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("society-console").expect("binary should build");
    cmd.env_remove("SOCIETY_CONSOLE_HOME")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

/// Run a prepared command off the async runtime so the stub backend keeps
/// serving while the binary blocks on it.
async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .expect("command thread panicked")
}

async fn seeded_backend() -> StubBackend {
    let backend = StubBackend::start().await;
    backend.add_workflow("wf-1", "Morning routine", "Commute and work", "2025-03-01T08:00:00Z");
    backend.add_workflow("wf-2", "flood drill", "Evacuate low ground", "2025-03-03T08:00:00Z");
    backend.add_workflow("wf-3", "Census", "", "2025-03-02T08:00:00Z");
    backend
}

#[test]
fn test_config_path_uses_data_dir_and_creates_file() {
    let dir = TempDir::new().unwrap();

    console(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    let contents = fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(contents.contains("[server]"));
    assert!(dir.path().join("logs").join("society-console.log").exists());
}

#[test]
fn test_data_dir_from_environment() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("society-console")
        .unwrap()
        .env("SOCIETY_CONSOLE_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(dir.path().to_string_lossy().as_ref()));
}

#[test]
fn test_set_server_edits_config_in_place() {
    let dir = TempDir::new().unwrap();

    console(dir.path())
        .args(["config", "set-server", "http://10.1.2.3:8080"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Server set to http://10.1.2.3:8080"));

    let contents = fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(contents.contains("url = \"http://10.1.2.3:8080\""));
    assert!(contents.contains("[player]"));
}

#[test]
fn test_replay_rejects_unknown_interval() {
    let dir = TempDir::new().unwrap();

    console(dir.path())
        .args([
            "replay",
            "00000000-0000-0000-0000-000000000000",
            "--interval",
            "750",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("750"));
}

#[tokio::test]
async fn test_workflows_list_searches_and_sorts() {
    let backend = seeded_backend().await;
    let dir = TempDir::new().unwrap();

    let mut cmd = console(dir.path());
    cmd.args(["--server", &backend.url(), "workflows", "list", "--sort", "name"]);
    let assert = run(cmd).await.success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let census = stdout.find("Census").expect("Census listed");
    let flood = stdout.find("flood drill").expect("flood drill listed");
    let morning = stdout.find("Morning routine").expect("Morning routine listed");
    assert!(census < flood && flood < morning, "{stdout}");
    assert!(stdout.contains("Page 1/1 · 3 of 3 workflows"));

    let mut cmd = console(dir.path());
    cmd.args(["--server", &backend.url(), "workflows", "list", "--search", "EVAC"]);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("flood drill"))
        .stdout(predicate::str::contains("Morning routine").not());
}

#[tokio::test]
async fn test_workflows_create_requires_name() {
    let backend = seeded_backend().await;
    let dir = TempDir::new().unwrap();

    let mut cmd = console(dir.path());
    cmd.args(["--server", &backend.url(), "workflows", "create", "--name", "   "]);
    run(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains(
            "Please enter a name for this configuration",
        ));
    assert!(!backend
        .requests()
        .contains(&"POST /api/workflow-configs".to_string()));
}

#[tokio::test]
async fn test_workflows_create_with_steps_file() {
    let backend = seeded_backend().await;
    let dir = TempDir::new().unwrap();
    let steps = dir.path().join("steps.json");
    fs::write(&steps, r#"[{"type": "step", "days": 3}, {"type": "intervene"}]"#).unwrap();

    let mut cmd = console(dir.path());
    cmd.args(["--server", &backend.url(), "workflows", "create", "--steps"])
        .arg(&steps);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Created Workflow 4"));

    let state = backend.state.lock();
    let created = state.workflows.last().unwrap();
    assert_eq!(created["config"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_workflows_duplicate_and_delete() {
    let backend = seeded_backend().await;
    let dir = TempDir::new().unwrap();

    let mut cmd = console(dir.path());
    cmd.args(["--server", &backend.url(), "workflows", "duplicate", "wf-3"]);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Created Census (Copy)"));

    let mut cmd = console(dir.path());
    cmd.args(["--server", &backend.url(), "workflows", "delete", "wf-1", "--yes"]);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Deleted wf-1"));

    assert_eq!(
        backend.workflow_names(),
        vec!["flood drill", "Census", "Census (Copy)"]
    );
}

#[tokio::test]
async fn test_workflows_delete_asks_for_confirmation() {
    let backend = seeded_backend().await;
    let dir = TempDir::new().unwrap();

    let mut cmd = console(dir.path());
    cmd.args(["--server", &backend.url(), "workflows", "delete", "wf-2"])
        .write_stdin("n\n");
    run(cmd)
        .await
        .success()
        .stderr(predicate::str::contains(
            "Are you sure you want to delete workflow wf-2?",
        ))
        .stdout(predicate::str::contains("Cancelled"));
    assert_eq!(backend.workflow_names().len(), 3);
    assert!(!backend
        .requests()
        .contains(&"DELETE /api/workflow-configs/wf-2".to_string()));

    let mut cmd = console(dir.path());
    cmd.args(["--server", &backend.url(), "workflows", "delete", "wf-2"])
        .write_stdin("Y\n");
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Deleted wf-2"));
    assert_eq!(backend.workflow_names(), vec!["Morning routine", "Census"]);
}

#[tokio::test]
async fn test_workflows_export_writes_pretty_json() {
    let backend = seeded_backend().await;
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    let mut cmd = console(dir.path());
    cmd.args(["--server", &backend.url(), "workflows", "export", "wf-2", "--out"])
        .arg(&out);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("flood_drill_workflow.json"));

    let contents = fs::read_to_string(out.join("flood_drill_workflow.json")).unwrap();
    assert!(contents.contains("\n  \"name\": \"flood drill\""));
}

#[tokio::test]
async fn test_workflows_export_defaults_to_data_dir() {
    let backend = seeded_backend().await;
    let dir = TempDir::new().unwrap();

    let mut cmd = console(dir.path());
    cmd.args(["--server", &backend.url(), "workflows", "export", "wf-1"]);
    run(cmd).await.success();

    assert!(dir
        .path()
        .join("exports")
        .join("Morning_routine_workflow.json")
        .exists());
}

#[tokio::test]
async fn test_unknown_workflow_fails() {
    let backend = seeded_backend().await;
    let dir = TempDir::new().unwrap();

    let mut cmd = console(dir.path());
    cmd.args(["--server", &backend.url(), "workflows", "export", "wf-404"]);
    run(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains("Workflow not found: wf-404"));
}
