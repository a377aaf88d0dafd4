//! CLI integration tests
//!
//! Tests the command-line interface using assert_cmd

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::MockService;

/// Get a command for the vidgen-client binary, isolated from the caller's environment
fn client_cmd() -> Command {
    let mut cmd = Command::cargo_bin("vidgen-client").unwrap();
    cmd.env_remove("VIDGEN_SERVICE_URL")
        .env_remove("VIDGEN_API_KEY")
        .env_remove("VIDGEN_CONFIG")
        .env_remove("VIDGEN_LOG_LEVEL")
        .env_remove("VIDGEN_LOG_FILE")
        .env_remove("VIDGEN_LOG_JSON");
    cmd
}

/// Write a config pointing at `url` and return its directory and path
fn config_for(url: &str) -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.toml");
    fs::write(
        &path,
        format!(
            "[service]\nurl = \"{}\"\napi_key = \"cli-key\"\nconnect_timeout_ms = 5000\n\n[logging]\nlevel = \"warn\"\n",
            url
        ),
    )
    .unwrap();
    let path = path.to_string_lossy().to_string();
    (dir, path)
}

// ─────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    client_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create-video"))
        .stdout(predicate::str::contains("send"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_flag() {
    client_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vidgen-client"));
}

// ─────────────────────────────────────────────────────────────────
// Config Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_masks_api_key() {
    let (_dir, path) = config_for("wss://video.example.com/production");

    client_cmd()
        .args(["config", "show", "--config", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("[service]"))
        .stdout(predicate::str::contains("[logging]"))
        .stdout(predicate::str::contains("cli-key").not());
}

#[test]
fn test_config_validate_fixture() {
    let path = common::fixture_path("valid_config.toml");

    client_cmd()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_invalid_fixture() {
    let path = common::fixture_path("invalid_config.toml");

    client_cmd()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .code(10)
        .stderr(predicate::str::contains("E102"));
}

#[test]
fn test_config_init_then_refuse_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.toml");
    let path = path.to_str().unwrap();

    client_cmd()
        .args(["config", "init", "--path", path])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));

    client_cmd()
        .args(["config", "init", "--path", path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ─────────────────────────────────────────────────────────────────
// Task Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_blank_prompt_rejected_before_connecting() {
    client_cmd()
        .args(["create-video", "--prompt", "   "])
        .assert()
        .code(40)
        .stderr(predicate::str::contains("E402"));
}

#[test]
fn test_send_rejects_invalid_json_task() {
    client_cmd()
        .args(["send", "--action", "echo", "--task", "{not json"])
        .assert()
        .code(40)
        .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn test_missing_api_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.toml");
    fs::write(&path, "[service]\nurl = \"ws://127.0.0.1:9/production\"\n").unwrap();

    client_cmd()
        .args(["create-video", "--prompt", "cats", "--config"])
        .arg(&path)
        .assert()
        .code(10)
        .stderr(predicate::str::contains("E103"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_video_follow_prints_link() {
    let service = MockService::start().await;
    let (_dir, path) = config_for(&service.ws_url());

    let assert = tokio::task::spawn_blocking(move || {
        client_cmd()
            .args(["create-video", "--prompt", "cats", "--follow", "--config", &path])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("rendering"))
        .stdout(predicate::str::contains(
            "Playlist: https://cdn.example.com/hls/abc/playlist.m3u8",
        ));

    let messages = service.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("\"api_key\":\"cli-key\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_prints_single_reply() {
    let service = MockService::start().await;
    let (_dir, path) = config_for(&service.ws_url());

    let assert = tokio::task::spawn_blocking(move || {
        client_cmd()
            .args(["send", "--action", "status", "--config", &path])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("\"id\": \"42\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_prints_remote_error() {
    let service = MockService::start().await;
    let (_dir, path) = config_for(&service.ws_url());

    let assert = tokio::task::spawn_blocking(move || {
        client_cmd()
            .args(["send", "--action", "fail", "--config", &path])
            .assert()
    })
    .await
    .unwrap();

    // A plain send prints whatever arrives, error or not
    assert
        .success()
        .stdout(predicate::str::contains("render failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_video_follow_quiet_still_prints_playlist() {
    let service = MockService::start().await;
    let (_dir, path) = config_for(&service.ws_url());

    let assert = tokio::task::spawn_blocking(move || {
        client_cmd()
            .args(["-q", "create-video", "--prompt", "cats", "--follow", "--config", &path])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("playlist.m3u8"))
        .stderr(predicate::str::is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_video_follow_fails_on_error_reply() {
    let service = MockService::start().await;
    let (_dir, path) = config_for(&service.ws_url());

    let assert = tokio::task::spawn_blocking(move || {
        client_cmd()
            .args(["create-video", "--prompt", "doomed", "--follow", "--config", &path])
            .assert()
    })
    .await
    .unwrap();

    assert
        .code(40)
        .stdout(predicate::str::contains("rendering"))
        .stdout(predicate::str::contains("render failed"))
        .stderr(predicate::str::contains("E403"))
        .stderr(predicate::str::contains("render failed"));
}
