//! Configuration loading facade
//!
//! Layers, lowest precedence first: merge-policy defaults, global file,
//! working-directory files (or one explicit file instead of both), the
//! environment, then command-line overrides.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::FsyncConfig;
use crate::error::SyncError;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Values given on the command line; they win over every other layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub source_dir: Option<PathBuf>,
    pub target: Option<String>,
    pub target_dir: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
}

impl ConfigOverrides {
    fn apply(
        &self,
        mut builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if let Some(dir) = &self.source_dir {
            builder = builder.set_override("source.directory", dir.to_string_lossy().into_owned())?;
        }
        if let Some(host) = &self.target {
            builder = builder.set_override("target.host", host.as_str())?;
        }
        if let Some(dir) = &self.target_dir {
            builder = builder.set_override("target.directory", dir.as_str())?;
        }
        if let Some(port) = self.port {
            builder = builder.set_override("target.port", port)?;
        }
        if let Some(user) = &self.user {
            builder = builder.set_override("target.user", user.as_str())?;
        }
        Ok(builder)
    }
}

/// Loads [`FsyncConfig`] from the configured layers
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load using the global file and the files in `directory`
    pub fn load(directory: &Path) -> Result<FsyncConfig, SyncError> {
        Self::load_with(directory, None, &ConfigOverrides::default())
    }

    /// Load from one explicit file (plus defaults and environment)
    pub fn load_from_file(path: &Path) -> Result<FsyncConfig, SyncError> {
        Self::load_with(Path::new("."), Some(path), &ConfigOverrides::default())
    }

    /// Full layering. An explicit `config_file` replaces the global and
    /// working-directory files and must exist.
    pub fn load_with(
        directory: &Path,
        config_file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<FsyncConfig, SyncError> {
        let mut builder = merge_policy::builder_with_defaults()?;

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(SyncError::Config(format!(
                        "configuration file not found: {}",
                        path.display()
                    )));
                }
                debug!(config_path = %path.display(), "Using explicit configuration file");
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                builder = global_file::add_to_builder(builder)?;
                builder = workspace_file::add_to_builder(builder, directory)?;
            }
        }

        builder = environment::add_to_builder(builder);
        builder = overrides.apply(builder)?;

        let config: FsyncConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}
