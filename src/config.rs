//! Configuration System
//!
//! Layered configuration for a mirror run: built-in defaults, the global
//! config file, the working-directory files, environment variables and
//! finally command-line overrides. Validation reports every problem at once.

use crate::logging::LoggingConfig;
use crate::sync::diff::{ChangePolicy, TimeComparison};
use crate::tree::walker::WalkerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::{ConfigLoader, ConfigOverrides};
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FsyncConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The local master tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory mirrored to the target
    #[serde(default)]
    pub directory: PathBuf,
}

/// How the target is reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Ftp,
    /// A directory on a locally mounted filesystem
    File,
}

/// The target tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub protocol: Protocol,

    /// Host name or IP address of the FTP server
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Target root. Empty means the FTP login directory.
    #[serde(default)]
    pub directory: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_port() -> u16 {
    21
}

fn default_user() -> String {
    "anonymous".to_string()
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            host: String::new(),
            port: default_port(),
            directory: String::new(),
            user: default_user(),
            password: String::new(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Filtering and change-detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub include_hidden: bool,

    /// Entry names ignored on both sides
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub skip_empty_directories: bool,

    #[serde(default)]
    pub time_comparison: TimeComparison,

    #[serde(default = "default_modify_window")]
    pub modify_window_secs: u64,

    /// Ask before executing a plan that deletes anything
    #[serde(default = "default_true")]
    pub confirm_deletions: bool,
}

fn default_modify_window() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            include_hidden: false,
            exclude: Vec::new(),
            skip_empty_directories: false,
            time_comparison: TimeComparison::default(),
            modify_window_secs: default_modify_window(),
            confirm_deletions: default_true(),
        }
    }
}

impl SyncConfig {
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            include_hidden: self.include_hidden,
            ignore_patterns: self.exclude.clone(),
            skip_empty_directories: self.skip_empty_directories,
        }
    }

    pub fn change_policy(&self) -> ChangePolicy {
        ChangePolicy {
            time_comparison: self.time_comparison,
            modify_window: Duration::from_secs(self.modify_window_secs),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Source(String),
    Target(String),
    Sync(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Source(msg) => write!(f, "source: {}", msg),
            ValidationError::Target(msg) => write!(f, "target: {}", msg),
            ValidationError::Sync(msg) => write!(f, "sync: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FsyncConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.source.directory.as_os_str().is_empty() {
            errors.push(ValidationError::Source(
                "directory must be set".to_string(),
            ));
        }

        match self.target.protocol {
            Protocol::Ftp => {
                if self.target.host.trim().is_empty() {
                    errors.push(ValidationError::Target(
                        "host must be set for ftp targets".to_string(),
                    ));
                }
                if self.target.port == 0 {
                    errors.push(ValidationError::Target("port cannot be 0".to_string()));
                }
                if self.target.connect_timeout_secs == 0 {
                    errors.push(ValidationError::Target(
                        "connect_timeout_secs must be positive".to_string(),
                    ));
                }
            }
            Protocol::File => {
                if self.target.directory.is_empty() {
                    errors.push(ValidationError::Target(
                        "directory must be set for file targets".to_string(),
                    ));
                }
            }
        }

        for pattern in &self.sync.exclude {
            if pattern.is_empty() || pattern.contains('/') {
                errors.push(ValidationError::Sync(format!(
                    "exclude pattern '{}' must be a single non-empty name",
                    pattern
                )));
            }
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Copy safe to print: the password is masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.target.password.is_empty() {
            copy.target.password = "********".to_string();
        }
        copy
    }
}
