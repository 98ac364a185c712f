//! CLI integration tests for the `remedy` binary.
//!
//! Uses `assert_cmd` to spawn the binary and verify exit codes, stdout
//! content, and stderr content. Every test that touches state points
//! `--state` and `--archive` into its own temp directory.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `remedy` binary, rooted at workspace.
fn remedy() -> Command {
    let mut cmd = cargo_bin_cmd!("remedy");
    cmd.current_dir(workspace_root());
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Helper: a `remedy` command bound to the state files in `dir`.
fn remedy_in(dir: &TempDir) -> Command {
    let mut cmd = remedy();
    cmd.arg("--state")
        .arg(dir.path().join("state.json"))
        .arg("--archive")
        .arg(dir.path().join("archive.jsonl"));
    cmd
}

/// Run `args` with `--output json` and parse stdout.
fn json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let out = remedy_in(dir)
        .args(args)
        .args(["--output", "json"])
        .output()
        .expect("run remedy");
    assert!(
        out.status.success(),
        "remedy {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    remedy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Remedy and mission orchestration engine",
        ));
}

#[test]
fn version_exits_0() {
    remedy()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("remedy"));
}

#[test]
fn unknown_subcommand_fails() {
    remedy().arg("frobnicate").assert().failure();
}

// ──────────────────────────────────────────────
// 2. Catalog and validate
// ──────────────────────────────────────────────

#[test]
fn catalog_text_lists_builtin_remedies() {
    remedy()
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("FOIA-REQUEST-01"))
        .stdout(predicate::str::contains("MISSION-FDCPA-01"));
}

#[test]
fn catalog_json_has_six_remedies() {
    let dir = TempDir::new().unwrap();
    let catalog = json(&dir, &["catalog"]);
    assert_eq!(catalog["remedies"].as_array().unwrap().len(), 6);
    assert_eq!(catalog["playbooks"].as_array().unwrap().len(), 2);
}

#[test]
fn validate_builtin_catalog() {
    remedy()
        .args(["validate", "crates/core/src/catalog/builtin.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    remedy()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error parsing JSON"));
}

#[test]
fn validate_rejects_schema_violation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "remedies": [{ "id": "X" }] }"#).unwrap();
    remedy()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid catalog"));
}

#[test]
fn validate_reports_dangling_step_reference() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dangling.json");
    let doc = serde_json::json!({
        "remedies": [{
            "id": "D",
            "name": "Broken",
            "authority": "none",
            "steps": [{
                "id": "a",
                "title": "A",
                "description": "",
                "action": { "type": "user_action", "description": "x" },
                "next_step": { "on_success": { "step": "missing" } }
            }]
        }]
    });
    fs::write(&path, doc.to_string()).unwrap();

    let out = remedy()
        .arg("validate")
        .arg(&path)
        .args(["--output", "json"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(report["valid"], false);
    let errors = report["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("missing"));
}

// ──────────────────────────────────────────────
// 3. Deadline
// ──────────────────────────────────────────────

#[test]
fn deadline_skips_weekend() {
    remedy()
        .args(["deadline", "--start", "2025-03-03T09:30:00Z", "--count", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-03-10T09:30:00Z (Monday)"));
}

#[test]
fn deadline_calendar_json() {
    let dir = TempDir::new().unwrap();
    let out = json(
        &dir,
        &[
            "deadline",
            "--start",
            "2025-03-07T10:00:00Z",
            "--count",
            "2",
            "--unit",
            "calendar",
        ],
    );
    assert_eq!(out["deadline"], "2025-03-09T10:00:00Z");
    assert_eq!(out["unit"], "calendar");
}

#[test]
fn deadline_saturates_instead_of_overflowing() {
    remedy()
        .args([
            "deadline",
            "--start",
            "2025-03-07T10:00:00Z",
            "--count",
            "4000000",
            "--unit",
            "calendar",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("9999-12-31T10:00:00Z"));
}

#[test]
fn deadline_rejects_bad_start() {
    remedy()
        .args(["deadline", "--start", "yesterday", "--count", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --start"));
}

// ──────────────────────────────────────────────
// 4. Remedy lifecycle
// ──────────────────────────────────────────────

#[test]
fn foia_request_lifecycle() {
    let dir = TempDir::new().unwrap();

    let started = json(
        &dir,
        &["initiate", "FOIA-REQUEST-01", "--var", "agency=EPA"],
    );
    assert_eq!(started["status"], "IN_PROGRESS");
    assert_eq!(started["current_step"]["id"], "foia-req-step-1");
    assert_eq!(started["variables"]["agency"], "EPA");
    let id = started["instance_id"].as_str().unwrap().to_string();

    let sent = json(&dir, &["report", &id, "success", "--notes", "mailed"]);
    assert_eq!(sent["status"], "AWAITING_RESPONSE");
    assert_eq!(sent["current_step"]["id"], "foia-req-step-2");
    assert_eq!(sent["history"].as_array().unwrap().len(), 1);
    assert!(sent["deadline"].is_string());

    let report = json(&dir, &["tick", "--now", "2099-01-01T00:00:00Z"]);
    let changes = report["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["change"], "escalated");
    assert_eq!(changes[0]["remedy_instance_id"], id.as_str());

    let shown = json(&dir, &["show", &id]);
    assert_eq!(shown["kind"], "remedy");
    assert_eq!(shown["status"], "ESCALATED");
    assert_eq!(shown["current_step"]["id"], "foia-req-end-failure");
}

#[test]
fn second_tick_is_quiet() {
    let dir = TempDir::new().unwrap();
    json(&dir, &["initiate", "FDCPA-DV-01"]);
    remedy_in(&dir)
        .args(["tick", "--now", "2099-01-01T00:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no changes"));
}

#[test]
fn initiate_unknown_definition_fails() {
    let dir = TempDir::new().unwrap();
    remedy_in(&dir)
        .args(["initiate", "NOPE-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOPE-01"));
}

#[test]
fn report_unknown_instance_fails() {
    let dir = TempDir::new().unwrap();
    remedy_in(&dir)
        .args(["report", "no-such-id", "success"])
        .assert()
        .failure();
}

#[test]
fn report_rejects_unknown_result() {
    let dir = TempDir::new().unwrap();
    remedy_in(&dir)
        .args(["report", "some-id", "maybe"])
        .assert()
        .failure();
}

#[test]
fn show_unknown_instance_fails() {
    let dir = TempDir::new().unwrap();
    remedy_in(&dir)
        .args(["show", "no-such-id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no remedy or mission 'no-such-id'"));
}

#[test]
fn cancel_remedy_closes_it_and_archives() {
    let dir = TempDir::new().unwrap();
    let started = json(&dir, &["initiate", "TAX-PTA-01"]);
    let id = started["instance_id"].as_str().unwrap().to_string();

    let cancelled = json(&dir, &["cancel", &id]);
    assert_eq!(cancelled["kind"], "remedy");
    assert_eq!(cancelled["status"], "CLOSED_FAILURE");

    let archive = fs::read_to_string(dir.path().join("archive.jsonl")).unwrap();
    assert!(archive.contains(&id));

    remedy_in(&dir)
        .args(["report", &id, "success"])
        .assert()
        .failure();
}

// ──────────────────────────────────────────────
// 5. Missions
// ──────────────────────────────────────────────

#[test]
fn launch_starts_first_remedy() {
    let dir = TempDir::new().unwrap();
    let mission = json(&dir, &["launch", "MISSION-FDCPA-01", "--var", "creditor=ACME"]);
    assert_eq!(mission["status"], "IN_PROGRESS");
    assert_eq!(mission["current_step_order"], 1);
    let remedy_id = mission["active_remedy_instance_id"]
        .as_str()
        .expect("active remedy")
        .to_string();

    let remedy = json(&dir, &["show", &remedy_id]);
    assert_eq!(remedy["definition_id"], "FDCPA-DV-01");
    assert_eq!(remedy["mission_instance_id"], mission["instance_id"]);
    assert_eq!(remedy["variables"]["creditor"], "ACME");

    let listing = json(&dir, &["list"]);
    assert_eq!(listing["remedies"].as_array().unwrap().len(), 1);
    assert_eq!(listing["missions"].as_array().unwrap().len(), 1);
}

#[test]
fn cancel_mission_fails_it() {
    let dir = TempDir::new().unwrap();
    let mission = json(&dir, &["launch", "MISSION-FOIA-01"]);
    let id = mission["instance_id"].as_str().unwrap().to_string();

    let cancelled = json(&dir, &["cancel", &id]);
    assert_eq!(cancelled["kind"], "mission");
    assert_eq!(cancelled["status"], "FAILED");

    let shown = json(&dir, &["show", &id]);
    assert_eq!(shown["kind"], "mission");
    assert_eq!(shown["status"], "FAILED");
    assert!(shown["active_remedy_instance_id"].is_null());
}

#[test]
fn launch_unknown_playbook_fails() {
    let dir = TempDir::new().unwrap();
    remedy_in(&dir)
        .args(["launch", "MISSION-NOPE"])
        .assert()
        .failure();
}

// ──────────────────────────────────────────────
// 6. Configuration
// ──────────────────────────────────────────────

#[test]
fn config_file_sets_state_path() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("from-config.json");
    let config = dir.path().join("remedy.toml");
    fs::write(
        &config,
        format!(
            "[storage]\nstate_path = {:?}\narchive_path = {:?}\n",
            state.display().to_string(),
            dir.path().join("a.jsonl").display().to_string()
        ),
    )
    .unwrap();

    remedy()
        .arg("--config")
        .arg(&config)
        .args(["initiate", "RESPA-QWR-01", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(state.is_file());
}

#[test]
fn missing_config_file_fails() {
    remedy()
        .args(["--config", "/nonexistent/remedy.toml", "catalog"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error reading config"));
}

#[test]
fn custom_catalog_replaces_builtin() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.json");
    let doc = serde_json::json!({
        "remedies": [{
            "id": "LOCAL-01",
            "name": "Local remedy",
            "authority": "Local ordinance",
            "steps": [{
                "id": "only",
                "title": "Only",
                "description": "",
                "action": { "type": "user_action", "description": "File it" },
                "next_step": { "on_success": "terminal", "on_failure": "terminal" }
            }]
        }]
    });
    fs::write(&path, doc.to_string()).unwrap();

    let mut cmd = remedy_in(&dir);
    cmd.arg("--catalog").arg(&path).args(["initiate", "LOCAL-01", "--output", "json"]);
    let out = cmd.output().unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let view: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let id = view["instance_id"].as_str().unwrap().to_string();

    let mut cmd = remedy_in(&dir);
    cmd.arg("--catalog")
        .arg(&path)
        .args(["report", &id, "success", "--output", "json"]);
    let out = cmd.output().unwrap();
    assert!(out.status.success());
    let view: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(view["status"], "CLOSED_SUCCESS");
}
