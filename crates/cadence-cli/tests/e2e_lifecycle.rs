//! E2E CLI tests covering:
//! - Database init and item creation
//! - Workflow transitions and history visibility in `cad show`
//! - Sprint lifecycle: new, assign, complete, KPI report
//! - Board cards and reconciliation
//! - Planning-poker estimate suggestion and `--apply`
//!
//! Each test runs the `cad` binary as a subprocess in an isolated temp
//! directory, so the default `cadence.db` path lands inside it.

use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the cad binary, rooted in `dir`.
fn cad_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cad"));
    cmd.current_dir(dir);
    cmd.env("CADENCE_LOG", "error");
    cmd
}

/// Initialize a tracker database in `dir`.
fn init_db(dir: &Path) {
    cad_cmd(dir).args(["init"]).assert().success();
}

/// Create an item via CLI, return its ID.
fn create_item(dir: &Path, project: &str, title: &str) -> String {
    let output = cad_cmd(dir)
        .args(["create", "--project", project, "--title", title, "--json"])
        .output()
        .expect("create should not crash");
    assert!(
        output.status.success(),
        "create failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: Value =
        serde_json::from_slice(&output.stdout).expect("create --json should produce valid JSON");
    json["id"]
        .as_str()
        .expect("create output should have 'id' field")
        .to_string()
}

/// Create a sprint via CLI, return its ID.
fn create_sprint(dir: &Path, project: &str, name: &str) -> String {
    let output = cad_cmd(dir)
        .args(["sprint", "new", "--project", project, "--name", name, "--json"])
        .output()
        .expect("sprint new should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    json["id"].as_str().expect("id field").to_string()
}

/// Fetch an item as JSON via `cad show`.
fn show_item(dir: &Path, id: &str) -> Value {
    let output = cad_cmd(dir)
        .args(["show", id, "--json"])
        .output()
        .expect("show should not crash");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("show --json should produce valid JSON")
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn init_creates_database_file() {
    let tmp = TempDir::new().expect("tempdir");
    init_db(tmp.path());
    assert!(tmp.path().join("cadence.db").exists());
}

#[test]
fn create_and_move_through_workflow() {
    let tmp = TempDir::new().expect("tempdir");
    init_db(tmp.path());

    let id = create_item(tmp.path(), "web", "Fix login timeout");

    cad_cmd(tmp.path())
        .args(["move", &id, "doing"])
        .assert()
        .success();
    cad_cmd(tmp.path())
        .args(["move", &id, "done"])
        .assert()
        .success();

    let item = show_item(tmp.path(), &id);
    assert_eq!(item["status"], "done");
    // Seed todo entry plus the two transitions.
    assert_eq!(item["history"].as_array().expect("history array").len(), 3);
}

#[test]
fn move_rejects_unknown_status() {
    let tmp = TempDir::new().expect("tempdir");
    init_db(tmp.path());
    let id = create_item(tmp.path(), "web", "A story");

    let output = cad_cmd(tmp.path())
        .args(["move", &id, "launched"])
        .output()
        .expect("move should not crash");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid status"), "stderr: {stderr}");
}

#[test]
fn move_repeating_current_status_appends_nothing() {
    let tmp = TempDir::new().expect("tempdir");
    init_db(tmp.path());
    let id = create_item(tmp.path(), "web", "A story");

    cad_cmd(tmp.path())
        .args(["move", &id, "todo"])
        .assert()
        .success();

    let item = show_item(tmp.path(), &id);
    assert_eq!(item["history"].as_array().expect("history array").len(), 1);
}

#[test]
fn show_unknown_item_fails_with_not_found() {
    let tmp = TempDir::new().expect("tempdir");
    init_db(tmp.path());

    let output = cad_cmd(tmp.path())
        .args(["show", "nope"])
        .output()
        .expect("show should not crash");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// Sprints and reports
// ---------------------------------------------------------------------------

#[test]
fn sprint_assign_and_report() {
    let tmp = TempDir::new().expect("tempdir");
    init_db(tmp.path());

    let sprint = create_sprint(tmp.path(), "web", "Sprint 12");
    let a = create_item(tmp.path(), "web", "Story A");
    let b = create_item(tmp.path(), "web", "Story B");

    for id in [&a, &b] {
        cad_cmd(tmp.path())
            .args(["sprint", "assign", id, &sprint])
            .assert()
            .success();
    }
    cad_cmd(tmp.path())
        .args(["move", &a, "doing"])
        .assert()
        .success();
    cad_cmd(tmp.path())
        .args(["move", &a, "done"])
        .assert()
        .success();

    let output = cad_cmd(tmp.path())
        .args(["sprint", "report", &sprint, "--json"])
        .output()
        .expect("report should not crash");
    assert!(output.status.success());
    let metrics: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(metrics["total_stories"], 2);
    assert_eq!(metrics["done_stories"], 1);
    assert_eq!(metrics["progress_pct"], 50.0);
}

#[test]
fn lead_report_requires_sprint_membership() {
    let tmp = TempDir::new().expect("tempdir");
    init_db(tmp.path());
    let id = create_item(tmp.path(), "web", "Unassigned story");

    cad_cmd(tmp.path()).args(["lead", &id]).assert().failure();

    let sprint = create_sprint(tmp.path(), "web", "Sprint 12");
    cad_cmd(tmp.path())
        .args(["sprint", "assign", &id, &sprint])
        .assert()
        .success();
    cad_cmd(tmp.path())
        .args(["move", &id, "done"])
        .assert()
        .success();

    let output = cad_cmd(tmp.path())
        .args(["lead", &id, "--json"])
        .output()
        .expect("lead should not crash");
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(report["within_target"], true);
    assert!(report["per_status_days"].get("todo").is_some());
}

#[test]
fn sprint_complete_stamps_once() {
    let tmp = TempDir::new().expect("tempdir");
    init_db(tmp.path());
    let sprint = create_sprint(tmp.path(), "web", "Sprint 12");

    cad_cmd(tmp.path())
        .args(["sprint", "complete", &sprint])
        .assert()
        .success();
    // Idempotent: the second completion keeps the first stamp.
    cad_cmd(tmp.path())
        .args(["sprint", "complete", &sprint])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[test]
fn board_add_show_and_reconcile() {
    let tmp = TempDir::new().expect("tempdir");
    init_db(tmp.path());
    let id = create_item(tmp.path(), "web", "Fix login");

    cad_cmd(tmp.path())
        .args([
            "board", "add", "--project", "web", "--title", "Fix login", "--status", "doing",
            "--item", &id,
        ])
        .assert()
        .success();

    // Linking in a doing column echoes back to the item.
    let item = show_item(tmp.path(), &id);
    assert_eq!(item["status"], "doing");

    // The item moves on; reconcile drags the card along.
    cad_cmd(tmp.path())
        .args(["move", &id, "testing"])
        .assert()
        .success();
    cad_cmd(tmp.path())
        .args(["board", "reconcile", "--project", "web"])
        .assert()
        .success();

    let output = cad_cmd(tmp.path())
        .args(["board", "show", "--project", "web", "--json"])
        .output()
        .expect("board show should not crash");
    assert!(output.status.success());
    let view: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(view["columns"].as_array().expect("columns").len(), 6);
    assert_eq!(view["cards"][0]["status"], "testing");
}

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

#[test]
fn estimate_snaps_to_deck_card() {
    let tmp = TempDir::new().expect("tempdir");
    let output = cad_cmd(tmp.path())
        .args(["estimate", "3", "5", "5", "8", "--json"])
        .output()
        .expect("estimate should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["suggestion"], 5.0);
    assert_eq!(json["counted_votes"], 4);
}

#[test]
fn estimate_ignores_non_numeric_votes() {
    let tmp = TempDir::new().expect("tempdir");
    let output = cad_cmd(tmp.path())
        .args(["estimate", "8", "?", "☕", "--json"])
        .output()
        .expect("estimate should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["suggestion"], 8.0);
    assert_eq!(json["counted_votes"], 1);
    assert_eq!(json["total_votes"], 3);
}

#[test]
fn estimate_counts_padded_votes() {
    let tmp = TempDir::new().expect("tempdir");
    let output = cad_cmd(tmp.path())
        .args(["estimate", " 5 ", "5", "?", "--json"])
        .output()
        .expect("estimate should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["suggestion"], 5.0);
    assert_eq!(json["counted_votes"], 2);
    assert_eq!(json["total_votes"], 3);
}

#[test]
fn estimate_all_abstentions_fails() {
    let tmp = TempDir::new().expect("tempdir");
    cad_cmd(tmp.path())
        .args(["estimate", "?", "☕"])
        .assert()
        .failure();
}

#[test]
fn estimate_apply_sets_points() {
    let tmp = TempDir::new().expect("tempdir");
    init_db(tmp.path());
    let id = create_item(tmp.path(), "web", "A story");

    cad_cmd(tmp.path())
        .args(["estimate", "3", "5", "--apply", &id])
        .assert()
        .success();

    let item = show_item(tmp.path(), &id);
    assert_eq!(item["points"], 3.0);
}