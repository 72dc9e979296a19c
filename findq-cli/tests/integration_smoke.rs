//! Smoke tests for the findq binary against a throwaway database

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn findq(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("findq").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("HOME", dir)
        .env(
            "FINDQ_DATABASE_URL",
            format!("sqlite://{}", dir.join("findq.sqlite").display()),
        )
        .env("FINDQ_STATIC_DIR", dir.join("static"));
    cmd
}

fn initialized() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    findq(dir.path())
        .arg("init-db")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database created."));
    dir
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("findq").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("init-db"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("findq").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Artifact format"));
}

#[test]
fn test_init_db_creates_layout() {
    let dir = initialized();
    assert!(dir.path().join("findq.sqlite").is_file());
    assert!(dir.path().join("static/qr_images").is_dir());
    assert!(dir.path().join("static/qr_ping_images").is_dir());
}

#[test]
fn test_user_and_code_add() {
    let dir = initialized();

    findq(dir.path())
        .args(["user", "add", "alice"])
        .assert()
        .success()
        .stdout("1\n");

    findq(dir.path())
        .args(["code", "add", "--user", "1", "Front Door"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1\t"));
    assert!(dir.path().join("static/qr_images/1.png").is_file());

    findq(dir.path())
        .args(["code", "render", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cached"));

    findq(dir.path())
        .args(["code", "list", "--user", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Front Door"))
        .stdout(predicate::str::contains("findq.francisdb.net/p/1"));
}

#[test]
fn test_invalid_input_fails() {
    let dir = initialized();

    findq(dir.path())
        .args(["user", "add", "two words"])
        .assert()
        .failure();

    findq(dir.path())
        .args(["code", "add", "--user", "99", "Gate"])
        .assert()
        .failure();
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    findq(dir.path())
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("init-db")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config not found"));
}
