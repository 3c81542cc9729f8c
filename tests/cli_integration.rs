//! CLI Integration Tests
//!
//! Tests the command-line interface end-to-end.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use systemize::core::ProjectStore;
use systemize::document::{DocPath, PatchValue, Phase, ProfileField, Project, Track};

/// Get the binary to test.
fn systemize() -> Command {
    Command::cargo_bin("systemize").unwrap()
}

/// A data directory holding one saved project.
fn saved_project() -> (TempDir, Project) {
    let dir = TempDir::new().unwrap();
    let mut project = Project::new(Track::Growth);
    project
        .apply_patch(&DocPath::Profile(ProfileField::BusinessName), PatchValue::Text("Acme".into()))
        .unwrap();
    project.phase = Phase::Assign;
    ProjectStore::new(dir.path()).save(&project).unwrap();
    (dir, project)
}

// ============================================================================
// Help & Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    systemize()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("documented systems"));
}

#[test]
fn test_version_flag() {
    systemize()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_subcommand_fails() {
    systemize().arg("frobnicate").assert().failure();
}

// ============================================================================
// List Command Tests
// ============================================================================

#[test]
fn test_list_empty_data_dir() {
    let dir = TempDir::new().unwrap();
    systemize()
        .args(["list", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved projects"));
}

#[test]
fn test_list_shows_saved_project() {
    let (dir, project) = saved_project();
    systemize()
        .args(["list", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme"))
        .stdout(predicate::str::contains(project.id.as_str()));
}

#[test]
fn test_list_json_output() {
    let (dir, _) = saved_project();
    systemize()
        .args(["list", "--format", "json", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["))
        .stdout(predicate::str::contains("\"phase\": \"assign\""));
}

#[test]
fn test_list_skips_corrupt_files() {
    let (dir, _) = saved_project();
    dir.child("projects/broken.json").write_str("{ not json").unwrap();
    systemize()
        .args(["list", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 projects"));
}

// ============================================================================
// Status Command Tests
// ============================================================================

#[test]
fn test_status_shows_phases() {
    let (dir, project) = saved_project();
    systemize()
        .args(["status", &project.id, "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme"))
        .stdout(predicate::str::contains("Track: growth"))
        .stdout(predicate::str::contains("▸ assign"));
}

#[test]
fn test_status_unknown_project() {
    let dir = TempDir::new().unwrap();
    systemize()
        .args(["status", "missing", "--data-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No project with id missing"));
}

#[test]
fn test_status_rejects_path_like_ids() {
    let dir = TempDir::new().unwrap();
    systemize()
        .args(["status", "../etc", "--data-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid project id"));
}

// ============================================================================
// Export Command Tests
// ============================================================================

#[test]
fn test_export_json_by_default() {
    let (dir, project) = saved_project();
    systemize()
        .args(["export", &project.id, "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"))
        .stdout(predicate::str::contains("\"businessName\": \"Acme\""));
}

#[test]
fn test_export_yaml() {
    let (dir, project) = saved_project();
    systemize()
        .args(["export", &project.id, "--format", "yaml", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("businessName: Acme"));
}

#[test]
fn test_export_rejects_unknown_format() {
    let (dir, project) = saved_project();
    systemize()
        .args(["export", &project.id, "--format", "xml", "--data-dir"])
        .arg(dir.path())
        .assert()
        .failure();
}

#[test]
fn test_export_corrupt_project_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    dir.child("projects/bad.json").write_str("[1, 2").unwrap();
    systemize()
        .args(["export", "bad", "--data-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));
}

// ============================================================================
// Config & Completions Tests
// ============================================================================

#[test]
fn test_config_path() {
    systemize()
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("systemize"));
}

#[test]
fn test_config_prints_sections() {
    systemize()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[conversation]"))
        .stdout(predicate::str::contains("[highlight]"));
}

#[test]
fn test_completions_bash() {
    systemize()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("systemize"));
}
