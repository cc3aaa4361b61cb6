//! End-to-end CLI tests for the audio-downloader binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const EXPORT: &str = r#"{
    "name": "Band Practice",
    "type": "private_group",
    "id": 4242,
    "messages": [
        {"id": 1, "type": "message", "date": "2023-05-01T10:00:00", "text": "hello"},
        {"id": 2, "type": "message", "date": "2023-05-01T10:05:00",
         "file": "files/song.mp3", "file_name": "song.mp3", "media_type": "audio_file",
         "mime_type": "audio/mpeg", "duration_seconds": 215},
        {"id": 3, "type": "message", "date": "2023-05-02T08:00:00",
         "file": "voice_messages/audio_1.ogg", "media_type": "voice_message",
         "mime_type": "audio/ogg", "duration_seconds": 4},
        {"id": 4, "type": "message",
         "file": "(File not included. Change data exporting settings to download.)",
         "media_type": "audio_file", "mime_type": "audio/flac"}
    ]
}"#;

struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let export = root.path().join("export");
        fs::create_dir_all(export.join("files")).unwrap();
        fs::write(export.join("result.json"), EXPORT).unwrap();
        fs::write(export.join("files/song.mp3"), b"ID3 content").unwrap();
        Self { root }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.root.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("audio-downloader").unwrap();
        cmd.env_remove("RUST_LOG")
            .env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.path("xdg"))
            .arg("--config")
            .arg(self.path("config.json"));
        cmd
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("audio-downloader").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scan chat history for audio"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("audio-downloader").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_scan_without_chat_is_user_error() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("scan")
        .arg("--export-dir")
        .arg(sandbox.path("export"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No chat selected"));
}

#[test]
fn test_scan_writes_report_into_output_dir() {
    let sandbox = Sandbox::new();
    let output = sandbox.path("out");

    sandbox
        .cmd()
        .args(["-q", "scan", "--chat", "4242"])
        .arg("--export-dir")
        .arg(sandbox.path("export"))
        .arg("--output-dir")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Scan finished for Band Practice (4242): found 3",
        ));

    let reports = files_in(&output);
    assert_eq!(reports.len(), 1, "only the summary report: {reports:?}");
    assert!(reports[0].ends_with("_scan_Band Practice (4242).txt"));
    let body = fs::read_to_string(output.join(&reports[0])).unwrap();
    assert!(body.contains("song.mp3 | message_id: 2 | duration: 215s | date: 2023-05-01 10:05:00"));
    assert!(body.contains("voice_3.ogg | message_id: 3"));
    assert!(body.contains("audio_4.flac | message_id: 4 | duration: N/A | date: N/A"));
}

#[test]
fn test_download_copies_available_files_and_logs_the_rest() {
    let sandbox = Sandbox::new();
    let output = sandbox.path("out");

    sandbox
        .cmd()
        .args(["-q", "download", "--chat", "4242"])
        .arg("--export-dir")
        .arg(sandbox.path("export"))
        .arg("--output-dir")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "found 3, downloaded 1, skipped 2, duplicates 0",
        ))
        .stdout(predicate::str::contains("Errors (2):"));

    let chat_dir = output.join("Band Practice (4242)");
    assert_eq!(fs::read(chat_dir.join("song.mp3")).unwrap(), b"ID3 content");
    let names = files_in(&chat_dir);
    assert!(names.iter().any(|n| n.contains("_downloaded_Band Practice (4242)")));
    assert!(names.iter().any(|n| n.contains("_download_errors_Band Practice (4242)")));
}

#[test]
fn test_second_download_counts_duplicates() {
    let sandbox = Sandbox::new();
    let output = sandbox.path("out");
    let run = || {
        sandbox
            .cmd()
            .args(["-q", "download", "--chat", "4242"])
            .arg("--export-dir")
            .arg(sandbox.path("export"))
            .arg("--output-dir")
            .arg(&output)
            .assert()
    };

    run().success();
    run()
        .success()
        .stdout(predicate::str::contains("downloaded 0, skipped 2, duplicates 1"));
}

#[test]
fn test_download_from_missing_export_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.path("out");

    sandbox
        .cmd()
        .args(["-q", "download", "--chat", "4242"])
        .arg("--export-dir")
        .arg(sandbox.path("nowhere"))
        .arg("--output-dir")
        .arg(&output)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Download failed for chat_4242"));

    let names = files_in(&output.join("chat_4242"));
    let error_report = names
        .iter()
        .find(|n| n.contains("_download_errors_chat_4242"))
        .unwrap();
    let body = fs::read_to_string(output.join("chat_4242").join(error_report)).unwrap();
    assert!(body.starts_with("Critical: authentication failed"));
}

#[test]
fn test_chats_lists_export_chats() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["-q", "chats", "--export-dir"])
        .arg(sandbox.path("export"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Band Practice (4242)"));
}

#[test]
fn test_config_init_then_show() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config_file = not found (using defaults)"))
        .stdout(predicate::str::contains("session_name = telegram_music"));

    sandbox.cmd().args(["config", "init"]).assert().success();
    assert!(sandbox.path("config.json").exists());

    sandbox
        .cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config_file = loaded"));
}

#[test]
fn test_config_supplies_chat_and_export() {
    let sandbox = Sandbox::new();
    let output = sandbox.path("out");
    let config = serde_json::json!({
        "chat_id": "4242",
        "export_dir": sandbox.path("export"),
        "download_folder": output,
    });
    fs::write(sandbox.path("config.json"), config.to_string()).unwrap();

    sandbox
        .cmd()
        .args(["-q", "scan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("found 3"));
    assert_eq!(files_in(&output).len(), 1);
}

#[test]
fn test_log_dir_receives_daily_log_file() {
    let sandbox = Sandbox::new();
    let logs = sandbox.path("logs");

    sandbox
        .cmd()
        .arg("--log-dir")
        .arg(&logs)
        .args(["chats", "--export-dir"])
        .arg(sandbox.path("export"))
        .assert()
        .success();

    let names = files_in(&logs);
    assert!(names.iter().any(|n| n.starts_with("app.log")), "{names:?}");
}

#[test]
fn test_config_set_persists_settings_for_later_runs() {
    let sandbox = Sandbox::new();
    let output = sandbox.path("out");
    let export = sandbox.path("export");

    for (key, value) in [
        ("chat_id", "4242"),
        ("export_dir", export.to_str().unwrap()),
        ("download_folder", output.to_str().unwrap()),
    ] {
        sandbox
            .cmd()
            .args(["config", "set", key, value])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("Set {key} in")));
    }

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(sandbox.path("config.json")).unwrap()).unwrap();
    assert_eq!(saved["chat_id"], "4242");
    assert_eq!(saved["session_name"], "telegram_music");

    sandbox
        .cmd()
        .args(["-q", "scan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("found 3"));
    assert_eq!(files_in(&output).len(), 1);
}

#[test]
fn test_config_set_keeps_existing_settings() {
    let sandbox = Sandbox::new();
    fs::write(
        sandbox.path("config.json"),
        r#"{ "api_id": "777", "chat_id": "1" }"#,
    )
    .unwrap();

    sandbox
        .cmd()
        .args(["config", "set", "chat_id", "-100123"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api_id = 777"))
        .stdout(predicate::str::contains("chat_id = -100123"));
}

#[test]
fn test_config_set_unknown_key_fails() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["config", "set", "colour", "blue"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown config key 'colour'"));
    assert!(!sandbox.path("config.json").exists());
}

#[test]
fn test_config_set_refuses_to_overwrite_unreadable_file() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.path("config.json"), "{ not json").unwrap();

    sandbox
        .cmd()
        .args(["config", "set", "chat_id", "4242"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not be read"));
    assert_eq!(
        fs::read_to_string(sandbox.path("config.json")).unwrap(),
        "{ not json"
    );
}
