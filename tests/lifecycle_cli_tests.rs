//! End-to-end tests for the lifecycle subcommands
//!
//! Each test gets its own config directory and instance record, and uses a
//! small shell script as the managed executable.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SELFSHIM_BINARY: &str = env!("CARGO_BIN_EXE_selfshim");

/// Write an executable script that stays alive until signalled
fn write_worker(dir: &Path, mode: u32) -> PathBuf {
    let path = dir.join("self_instance");
    fs::write(&path, "#!/bin/sh\nexec sleep 30\n").expect("failed to write worker script");
    fs::set_permissions(&path, fs::Permissions::from_mode(mode))
        .expect("failed to set worker permissions");
    path
}

fn write_config(temp_dir: &TempDir, executable: &Path) {
    let contents = format!(
        "[launch]\ninstance_dir = \"{dir}/\"\n\n[binding]\nkind = \"process\"\nexecutable = \"{exe}\"\nstop_grace_secs = 1\n",
        dir = temp_dir.path().display(),
        exe = executable.display()
    );
    fs::write(temp_dir.path().join("config.toml"), contents).expect("failed to write config.toml");
}

fn selfshim(temp_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(SELFSHIM_BINARY)
        .args(args)
        .env("SELFSHIM_CONFIG_DIR", temp_dir.path())
        .env("SELFSHIM_STATE_FILE", temp_dir.path().join("instance.json"))
        .env("NO_COLOR", "1")
        .env_remove("JOURNAL_STREAM")
        .output()
        .expect("failed to run selfshim binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_activate_status_deactivate_cycle() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let worker = write_worker(temp_dir.path(), 0o755);
    write_config(&temp_dir, &worker);

    let output = selfshim(&temp_dir, &["activate"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Self running..."));
    assert!(temp_dir.path().join("instance.json").exists());

    let output = selfshim(&temp_dir, &["status"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Status: running"));

    let output = selfshim(&temp_dir, &["activate"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Self already running..."));

    let output = selfshim(&temp_dir, &["deactivate"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Self stopped"));

    let output = selfshim(&temp_dir, &["status"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).contains("Status: not running"));
}

#[test]
fn test_deactivate_when_not_running() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let worker = write_worker(temp_dir.path(), 0o755);
    write_config(&temp_dir, &worker);

    let output = selfshim(&temp_dir, &["deactivate"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Self not running"));
}

#[test]
fn test_unspawnable_worker_reports_failed_start() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let worker = write_worker(temp_dir.path(), 0o644);
    write_config(&temp_dir, &worker);

    let output = selfshim(&temp_dir, &["activate"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Failed to start self..."));
    assert!(!temp_dir.path().join("instance.json").exists());
}

#[test]
fn test_missing_executable_is_binding_error() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    write_config(&temp_dir, &temp_dir.path().join("absent"));

    let output = selfshim(&temp_dir, &["activate"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Managed executable not found"));
}

#[test]
fn test_missing_library_is_binding_error() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    fs::write(
        temp_dir.path().join("config.toml"),
        "[binding]\nkind = \"library\"\nlibrary = \"selfshim_definitely_absent\"\n",
    )
    .expect("failed to write config.toml");

    let output = selfshim(&temp_dir, &["activate"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load native library"));
}

#[test]
fn test_invalid_config_exits_with_config_error() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    fs::write(
        temp_dir.path().join("config.toml"),
        "[launch]\nflag = \"\"\n",
    )
    .expect("failed to write config.toml");

    let output = selfshim(&temp_dir, &["activate"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Flag cannot be empty"));
}
