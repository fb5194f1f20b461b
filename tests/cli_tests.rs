//! CLI integration tests

use std::process::Command;

fn mixscribe_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mixscribe"))
}

/// Point the config store at a throwaway directory so tests never touch the
/// user's real config file.
fn isolated_bin(dir: &tempfile::TempDir) -> Command {
    let mut cmd = mixscribe_bin();
    cmd.env("XDG_CONFIG_HOME", dir.path());
    cmd.env("HOME", dir.path());
    cmd
}

#[test]
fn help_output() {
    let output = mixscribe_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("system audio"));
    assert!(stdout.contains("--output-folder"));
    assert!(stdout.contains("--loopback-device"));
    assert!(stdout.contains("--mic-device"));
    assert!(stdout.contains("--no-transcribe"));
    assert!(stdout.contains("devices"));
    assert!(stdout.contains("import"));
}

#[test]
fn version_output() {
    let output = mixscribe_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mixscribe"));
}

#[test]
fn config_path_command() {
    let dir = tempfile::tempdir().unwrap();
    let output = isolated_bin(&dir)
        .args(["config", "path"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mixscribe"));
    assert!(stdout.contains("config.json"));
}

#[test]
fn config_get_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let output = isolated_bin(&dir)
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid keys"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();

    let output = isolated_bin(&dir)
        .args(["config", "set", "loopback_device_id", "sink.monitor"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let output = isolated_bin(&dir)
        .args(["config", "get", "loopback_device_id"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sink.monitor"));
}

#[test]
fn config_list_shows_all_keys() {
    let dir = tempfile::tempdir().unwrap();
    let output = isolated_bin(&dir)
        .args(["config", "list"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for key in [
        "loopback_device_id",
        "mic_device_id",
        "output_folder",
        "language",
        "whisper_bin",
        "whisper_model",
    ] {
        assert!(stdout.contains(key), "missing key: {}", key);
    }
}

#[test]
fn config_init_refuses_second_run() {
    let dir = tempfile::tempdir().unwrap();

    let output = isolated_bin(&dir)
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let output = isolated_bin(&dir)
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already exists"));
}

#[test]
fn import_missing_file_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = isolated_bin(&dir)
        .args(["import", "/nonexistent/audio.wav"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No such audio file"));
}
