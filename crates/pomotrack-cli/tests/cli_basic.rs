//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with an isolated HOME and verify outputs.

use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command against `home` and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomotrack"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("POMOTRACK_ENV")
        .env_remove("POMOTRACK_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(home: &TempDir, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed {:?}: {}", args, stderr);
    stdout
}

#[test]
fn test_task_empty_list_placeholder() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(&home, &["task", "list"]);
    assert!(out.contains("No tasks yet"));
}

#[test]
fn test_task_lifecycle() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(&home, &["task", "add", "buy", "milk"]);
    assert!(out.contains("Task added: 1"));
    run_cli_success(&home, &["task", "add", "write report"]);

    let json = run_cli_success(&home, &["task", "list", "--json"]);
    let items: serde_json::Value = serde_json::from_str(&json).unwrap();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["text"], "write report");
    assert_eq!(items[1]["text"], "buy milk");

    let out = run_cli_success(&home, &["task", "done", "1"]);
    assert!(out.contains("marked done"));
    let out = run_cli_success(&home, &["task", "list"]);
    assert!(out.contains("[x]   1  buy milk"));

    run_cli_success(&home, &["task", "edit", "2", "write", "final", "report"]);
    run_cli_success(&home, &["task", "remove", "1"]);
    let json = run_cli_success(&home, &["task", "list", "--json"]);
    let items: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["text"], "write final report");
}

#[test]
fn test_task_add_blank_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["task", "add", "   "]);
    assert_ne!(code, 0);
    assert!(stderr.contains("empty"));
}

#[test]
fn test_stats_on_fresh_install() {
    let home = TempDir::new().unwrap();
    let json = run_cli_success(&home, &["stats", "all"]);
    let stats: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["streak"], 0);
    assert_eq!(stats["average_per_active_day"], 0.0);

    let json = run_cli_success(&home, &["stats", "week", "--json"]);
    let week: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(week.as_array().unwrap().len(), 7);
}

#[test]
fn test_work_session_is_recorded() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(&home, &["timer", "run", "--seconds", "1"]);
    assert!(out.contains("Work session complete!"));
    assert!(out.contains("Streak: 1"));

    let json = run_cli_success(&home, &["stats", "today"]);
    let stats: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(stats["today"], 1);
    assert_eq!(stats["total"], 1);
}

#[test]
fn test_break_session_is_not_recorded() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(&home, &["timer", "run", "--mode", "short-break", "--seconds", "1"]);
    assert!(out.contains("Break over!"));

    let json = run_cli_success(&home, &["stats", "today"]);
    let stats: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(stats["total"], 0);
}

#[test]
fn test_timer_rejects_zero_length() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(&home, &["timer", "run", "--seconds", "0"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_get_set() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(&home, &["config", "get", "timer.work_minutes"]);
    assert_eq!(out.trim(), "25");

    run_cli_success(&home, &["config", "set", "timer.work_minutes", "40"]);
    let out = run_cli_success(&home, &["timer", "presets"]);
    assert!(out.contains("40:00"));

    let (_, _, code) = run_cli(&home, &["config", "set", "timer.bogus", "1"]);
    assert_ne!(code, 0);

    run_cli_success(&home, &["config", "reset"]);
    let out = run_cli_success(&home, &["config", "get", "timer.work_minutes"]);
    assert_eq!(out.trim(), "25");
}
