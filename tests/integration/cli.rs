//! Integration tests for the `bhavcopy` binary
//!
//! Only commands that never reach the network are exercised here.

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

fn bhavcopy() -> Command {
    Command::cargo_bin("bhavcopy").unwrap()
}

fn repo_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_calendar_lists_holiday_week() {
    let stdout = stdout_of(bhavcopy().args([
        "calendar",
        "--start",
        "2025-02-24",
        "--end",
        "2025-03-02",
    ]));

    assert!(stdout.contains("NSE equity segment 2025"));
    assert!(stdout.contains("holiday (Mahashivratri)"));
    assert!(stdout.contains("4 trading day(s)"));
}

#[test]
fn test_calendar_json_output() {
    let stdout = stdout_of(bhavcopy().args([
        "--output-format",
        "json",
        "calendar",
        "--start",
        "2025-02-25",
        "--end",
        "2025-02-27",
        "--trading-only",
    ]));

    let rows: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["date"], "2025-02-25");
    assert_eq!(rows[1]["date"], "2025-02-27");
    assert_eq!(
        rows[0]["expected_publication"],
        "2025-02-25T18:30:00+05:30"
    );
}

#[test]
fn test_calendar_rejects_inverted_span() {
    bhavcopy()
        .args(["calendar", "--start", "2025-03-01", "--end", "2025-02-01"])
        .assert()
        .failure();
}

#[test]
fn test_calendar_rejects_malformed_date() {
    bhavcopy()
        .args(["calendar", "--start", "01/03/2025"])
        .assert()
        .failure();
}

#[test]
fn test_download_future_span_fails_without_network() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("future.zip");

    bhavcopy()
        .args(["download", "--start", "2999-01-01", "--end", "2999-01-02", "--no-progress", "-o"])
        .arg(&output)
        .assert()
        .failure();
    assert!(!output.exists());
}

#[test]
fn test_download_weekend_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("weekend.zip");

    let stdout = stdout_of(
        bhavcopy()
            .args([
                "--output-format",
                "json",
                "download",
                "--start",
                "2025-01-04",
                "--end",
                "2025-01-05",
                "-o",
            ])
            .arg(&output),
    );

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["summary"]["weekend_count"], 2);
    assert_eq!(report["summary"]["fetched_count"], 0);
    assert!(report["output"].is_null());
    assert!(!output.exists());
}

#[test]
fn test_rejects_excessive_concurrency() {
    bhavcopy()
        .args(["--concurrency", "64", "calendar"])
        .assert()
        .failure();
}

#[test]
fn test_validate_bundled_holidays() {
    let stdout = stdout_of(
        bhavcopy()
            .args(["validate", "holidays"])
            .arg(repo_file("config/holidays/nse-2025.toml")),
    );

    assert!(stdout.contains("Valid holiday table: NSE equity segment 2025"));
    assert!(stdout.contains("Holidays: 14"));
}

#[test]
fn test_validate_shipped_config() {
    let stdout = stdout_of(
        bhavcopy()
            .args(["validate", "config"])
            .arg(repo_file("config/bhavcopy.toml")),
    );

    assert!(stdout.contains("Publication: 18:30 Asia/Kolkata"));
}

#[test]
fn test_validate_rejects_broken_holiday_table() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(
        &path,
        "years = [2025]\n\n[[holiday]]\ndate = \"2024-12-25\"\nname = \"Christmas\"\n",
    )
    .unwrap();

    bhavcopy()
        .args(["validate", "holidays"])
        .arg(&path)
        .assert()
        .failure();
}
