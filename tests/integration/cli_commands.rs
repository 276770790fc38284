//! Integration tests driving the fsync binary against a local directory target

use super::test_utils::write_tree;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct Fixture {
    root: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        for dir in ["source", "target", "home", "config-home"] {
            fs::create_dir_all(root.path().join(dir)).unwrap();
        }
        let config = format!(
            "[source]\ndirectory = {:?}\n\n[target]\nprotocol = \"file\"\ndirectory = {:?}\n",
            root.path().join("source"),
            root.path().join("target").to_string_lossy(),
        );
        fs::write(root.path().join("fsync.toml"), config).unwrap();
        Self { root }
    }

    fn source(&self) -> PathBuf {
        self.path("source")
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_fsync"))
            .current_dir(self.root.path())
            .env("HOME", self.path("home"))
            .env("XDG_CONFIG_HOME", self.path("config-home"))
            .env_remove("FSYNC_ENV")
            .env_remove("FSYNC_LOG")
            .env("FSYNC_LOG_OUTPUT", "stderr")
            .args(args)
            .output()
            .unwrap()
    }
}

#[test]
fn test_sync_copies_tree_and_exits_zero() {
    let fixture = Fixture::new();
    write_tree(&fixture.source(), &[("album/01.mp3", "one"), ("cover.jpg", "jpg")]);

    let output = fixture.run(&["sync", "--yes"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout);
    assert!(stdout.contains("+ album/01.mp3"));
    assert!(stdout.contains("Fully synchronized."));
    assert_eq!(
        fs::read_to_string(fixture.path("target/album/01.mp3")).unwrap(),
        "one"
    );

    let again = fixture.run(&["sync", "--yes"]);
    assert_eq!(again.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&again.stdout).contains("Nothing to do"));
}

#[test]
fn test_plan_json_changes_nothing() {
    let fixture = Fixture::new();
    write_tree(&fixture.source(), &[("a.txt", "a")]);
    write_tree(&fixture.path("target"), &[("stale.txt", "s")]);

    let output = fixture.run(&["plan", "--format", "json"]);
    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["plan"][0]["action"], "upload_file");
    assert_eq!(value["plan"][1]["action"], "delete_file");
    assert!(fixture.path("target/stale.txt").exists());
    assert!(!fixture.path("target/a.txt").exists());
}

#[test]
fn test_deletions_without_terminal_are_cancelled() {
    let fixture = Fixture::new();
    write_tree(&fixture.path("target"), &[("stale.txt", "s")]);

    let output = Command::new(env!("CARGO_BIN_EXE_fsync"))
        .current_dir(fixture.root.path())
        .env("HOME", fixture.path("home"))
        .env("XDG_CONFIG_HOME", fixture.path("config-home"))
        .arg("sync")
        .stdin(std::process::Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(fixture.path("target/stale.txt").exists());
}

#[test]
fn test_missing_source_exits_two() {
    let fixture = Fixture::new();
    let output = fixture.run(&["sync", "--yes", "--source-dir", "does/not/exist"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does/not/exist"));
}

#[test]
fn test_config_command_redacts_password() {
    let fixture = Fixture::new();
    let output = Command::new(env!("CARGO_BIN_EXE_fsync"))
        .current_dir(fixture.root.path())
        .env("HOME", fixture.path("home"))
        .env("XDG_CONFIG_HOME", fixture.path("config-home"))
        .env("FSYNC_TARGET__PASSWORD", "s3cret")
        .args(["config", "--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["target"]["password"], "********");
    assert_eq!(value["target"]["protocol"], "file");
}
