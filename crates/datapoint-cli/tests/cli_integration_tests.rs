//! CLI integration tests
//!
//! Drive the built `datapoint` binary against a temporary SQLite file.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn run(db: &Path, allow: bool, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_datapoint"));
    cmd.arg("--db")
        .arg(db)
        .args(args)
        .env_remove("ALLOW")
        .env_remove("DATAPOINT_QUERY_MODE")
        .env("DATAPOINT_LOG_PROFILE", "production")
        .env("DATAPOINT_ALLOW", if allow { "true" } else { "false" });
    cmd.output().expect("Failed to execute CLI")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("data").join("store.db")
}

fn create(db: &Path, created_at: &str, value: i64) {
    let payload = format!(r#"{{"value": {}}}"#, value);
    let output = run(
        db,
        true,
        &[
            "create",
            "--owner",
            "u1",
            "--name",
            "d1",
            "--created-at",
            created_at,
            "--payload",
            &payload,
        ],
    );
    stdout_json(&output);
}

#[test]
fn test_create_prints_stored_record() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir);

    let output = run(
        &db,
        true,
        &[
            "create",
            "--owner",
            "u1",
            "--name",
            "d1",
            "--created-at",
            "2024-01-01T00:00:00.000Z",
            "--payload",
            r#"{"value": 7}"#,
        ],
    );
    let record = stdout_json(&output);
    assert_eq!(record["PK"], "u1#d1");
    assert_eq!(record["SK"], "2024-01-01T00:00:00.000Z");
    assert_eq!(record["value"], 7);
}

#[test]
fn test_create_denied_without_allow() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir);

    let output = run(&db, false, &["create", "--owner", "u1", "--name", "d1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_UNAUTHORIZED"), "stderr: {}", stderr);
}

#[test]
fn test_list_pages_with_next_token() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir);
    for (i, ts) in ["2024-01-01", "2024-01-02", "2024-01-03"].iter().enumerate() {
        create(&db, ts, i as i64);
    }

    let first = stdout_json(&run(
        &db,
        false,
        &["list", "--owner", "u1", "--name", "d1", "--limit", "2"],
    ));
    assert_eq!(first["count"], 2);
    let token = first["nextToken"].as_str().expect("token on first page").to_string();

    let second = stdout_json(&run(
        &db,
        false,
        &[
            "list",
            "--owner",
            "u1",
            "--name",
            "d1",
            "--limit",
            "2",
            "--next-token",
            &token,
        ],
    ));
    assert_eq!(second["count"], 1);
    assert_eq!(second["items"][0]["SK"], "2024-01-03");
    assert_eq!(second["nextToken"], Value::Null);
}

#[test]
fn test_list_between_descending() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir);
    for (i, ts) in ["2024-01-01", "2024-01-15", "2024-02-01"].iter().enumerate() {
        create(&db, ts, i as i64);
    }

    let page = stdout_json(&run(
        &db,
        false,
        &[
            "list",
            "--owner",
            "u1",
            "--name",
            "d1",
            "--between",
            "2024-01-01",
            "2024-01-31",
            "--sort-direction",
            "DESC",
        ],
    ));
    let sks: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["SK"].as_str().unwrap())
        .collect();
    assert_eq!(sks, vec!["2024-01-15", "2024-01-01"]);
}

#[test]
fn test_conflicting_filters_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir);
    let output = run(
        &db,
        false,
        &["list", "--owner", "u1", "--name", "d1", "--gt", "a", "--lt", "z"],
    );
    assert!(!output.status.success());
}
