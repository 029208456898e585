//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each test points
//! HOME at its own temporary directory so config and memory never leak between
//! tests or into the real user profile.

use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command with `home` as the home directory and return output.
fn run_cli_in(home: &TempDir, args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "meterspread-cli", "--"])
        .args(args)
        .env("HOME", home.path())
        .env_remove("METERSPREAD_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn split_json(home: &TempDir, extra: &[&str]) -> serde_json::Value {
    let mut args = vec!["split", "--json"];
    args.extend_from_slice(extra);
    let (code, stdout, stderr) = run_cli_in(home, &args);
    assert_eq!(code, 0, "split failed: {stderr}");
    serde_json::from_str(&stdout).expect("split --json should print JSON")
}

#[test]
fn test_split_table() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli_in(
        &home,
        &[
            "split", "--start", "100", "--end", "124", "--buckets", "4", "--start-hour", "8",
            "--profile", "flat", "--precision", "0", "--no-memory",
        ],
    );
    assert_eq!(code, 0, "split failed");
    assert!(stdout.contains("08:00"));
    assert!(stdout.contains("11:00"));
    assert!(stdout.contains("124"));
    assert!(stdout.contains("Verified"));
}

#[test]
fn test_split_json_sums_to_delta() {
    let home = TempDir::new().unwrap();
    let parsed = split_json(
        &home,
        &["--start", "0", "--end", "10", "--buckets", "3", "--start-hour", "8", "--seed", "7", "--no-memory"],
    );

    let results = parsed["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    let total: f64 = results.iter().map(|r| r["value"].as_f64().unwrap()).sum();
    assert!((total - 10.0).abs() < 1e-9);
    assert_eq!(results[2]["cumulative"].as_f64().unwrap(), 10.0);
    assert_eq!(results[0]["label"], "Period 1");
    assert_eq!(results[0]["hour_label"], "08:00");
}

#[test]
fn test_split_seed_is_reproducible() {
    let home = TempDir::new().unwrap();
    let args = ["--start", "0", "--end", "240", "--buckets", "24", "--start-hour", "0", "--seed", "42", "--no-memory"];
    let a = split_json(&home, &args);
    let b = split_json(&home, &args);
    assert_eq!(a["results"], b["results"]);
}

#[test]
fn test_split_chart() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli_in(
        &home,
        &["split", "--start", "0", "--end", "50", "--buckets", "6", "--start-hour", "9", "--no-memory", "--chart"],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Usage by Hour"));
}

#[test]
fn test_split_rejects_reversed_readings() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli_in(
        &home,
        &["split", "--start", "10", "--end", "5", "--buckets", "4", "--no-memory"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("error: Distribution error: Invalid range"));
}

#[test]
fn test_split_rejects_zero_buckets() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli_in(
        &home,
        &["split", "--start", "0", "--end", "5", "--buckets", "0", "--no-memory"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("error"));
}

#[test]
fn test_split_rejects_bad_start_hour() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli_in(
        &home,
        &["split", "--start", "0", "--end", "5", "--start-hour", "24"],
    );
    assert_ne!(code, 0);
}

#[test]
fn test_memory_learns_and_resets() {
    let home = TempDir::new().unwrap();
    split_json(&home, &["--start", "0", "--end", "24", "--buckets", "4", "--start-hour", "10", "--seed", "1"]);

    let (code, stdout, _) = run_cli_in(&home, &["memory", "show", "--json"]);
    assert_eq!(code, 0);
    let learned: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(learned["10"]["sampleCount"], 1);
    assert!(learned.get("14").is_none());

    let (code, stdout, _) = run_cli_in(&home, &["memory", "reset"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("reset"));

    let (_, stdout, _) = run_cli_in(&home, &["memory", "show", "--json"]);
    assert_eq!(stdout.trim(), "{}");
}

#[test]
fn test_no_memory_leaves_store_untouched() {
    let home = TempDir::new().unwrap();
    split_json(&home, &["--start", "0", "--end", "24", "--buckets", "4", "--start-hour", "10", "--no-memory"]);
    let (code, stdout, _) = run_cli_in(&home, &["memory", "show", "--json"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "{}");
}

#[test]
fn test_config_get_set() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli_in(&home, &["config", "get", "engine.realism_ceiling"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "60.0");

    let (code, _, _) = run_cli_in(&home, &["config", "set", "defaults.profile", "commercial"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli_in(&home, &["config", "get", "defaults.profile"]);
    assert_eq!(stdout.trim(), "commercial");

    let (code, _, _) = run_cli_in(&home, &["config", "get", "nope.missing"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_seed_can_be_cleared() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli_in(&home, &["config", "set", "engine.seed", "42"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli_in(&home, &["config", "get", "engine.seed"]);
    assert_eq!(stdout.trim(), "42");

    let (code, _, stderr) = run_cli_in(&home, &["config", "set", "engine.seed", "none"]);
    assert_eq!(code, 0, "clearing seed failed: {stderr}");
    let (_, stdout, _) = run_cli_in(&home, &["config", "get", "engine.seed"]);
    assert_eq!(stdout.trim(), "null");
}

#[test]
fn test_config_list_and_reset() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli_in(&home, &["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed.get("engine").is_some());

    let (code, stdout, _) = run_cli_in(&home, &["config", "reset"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("reset"));
}
