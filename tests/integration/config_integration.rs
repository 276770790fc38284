//! Integration tests for layered configuration loading

use super::test_utils::with_isolated_env;
use fsync::config::{global_config_path, ConfigLoader, ConfigOverrides, Protocol};
use fsync::sync::TimeComparison;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_defaults_without_any_file() {
    let test_dir = TempDir::new().unwrap();
    let working = TempDir::new().unwrap();
    let config = with_isolated_env(&test_dir, None, || ConfigLoader::load(working.path()).unwrap());

    assert_eq!(config.target.protocol, Protocol::Ftp);
    assert_eq!(config.target.port, 21);
    assert_eq!(config.target.user, "anonymous");
    assert_eq!(config.sync.time_comparison, TimeComparison::Differs);
    assert!(config.validate().is_err());
}

#[test]
fn test_working_directory_overrides_global() {
    let test_dir = TempDir::new().unwrap();
    let working = TempDir::new().unwrap();

    let config = with_isolated_env(&test_dir, None, || {
        let global = global_config_path().unwrap();
        fs::create_dir_all(global.parent().unwrap()).unwrap();
        fs::write(
            &global,
            "[target]\nhost = \"global-host\"\nuser = \"global-user\"\n",
        )
        .unwrap();
        fs::write(
            working.path().join("fsync.toml"),
            "[source]\ndirectory = \"/music\"\n[target]\nhost = \"local-host\"\n",
        )
        .unwrap();

        ConfigLoader::load(working.path()).unwrap()
    });

    assert_eq!(config.target.host, "local-host");
    assert_eq!(config.target.user, "global-user");
    assert_eq!(config.source.directory, PathBuf::from("/music"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_environment_specific_file_layers_on_top() {
    let test_dir = TempDir::new().unwrap();
    let working = TempDir::new().unwrap();
    fs::write(
        working.path().join("fsync.toml"),
        "[sync]\nmodify_window_secs = 2\nexclude = [\"Thumbs.db\"]\n",
    )
    .unwrap();
    fs::write(
        working.path().join("fsync.player.toml"),
        "[sync]\nmodify_window_secs = 3600\n",
    )
    .unwrap();

    let config = with_isolated_env(&test_dir, Some("player"), || {
        ConfigLoader::load(working.path()).unwrap()
    });
    assert_eq!(config.sync.modify_window_secs, 3600);
    assert_eq!(config.sync.exclude, vec!["Thumbs.db".to_string()]);
}

#[test]
fn test_explicit_file_replaces_other_files() {
    let test_dir = TempDir::new().unwrap();
    let working = TempDir::new().unwrap();
    fs::write(
        working.path().join("fsync.toml"),
        "[target]\nhost = \"ignored\"\n",
    )
    .unwrap();
    let explicit = test_dir.path().join("explicit.toml");
    fs::write(&explicit, "[target]\nport = 2121\n").unwrap();

    let config = with_isolated_env(&test_dir, None, || {
        ConfigLoader::load_with(working.path(), Some(&explicit), &ConfigOverrides::default())
            .unwrap()
    });
    assert_eq!(config.target.host, "");
    assert_eq!(config.target.port, 2121);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let test_dir = TempDir::new().unwrap();
    let explicit = test_dir.path().join("broken.toml");
    fs::write(&explicit, "[target\nhost = ").unwrap();

    let err = with_isolated_env(&test_dir, None, || {
        ConfigLoader::load_from_file(&explicit).unwrap_err()
    });
    assert!(matches!(err, fsync::error::SyncError::Config(_)));
}
