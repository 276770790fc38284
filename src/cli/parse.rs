//! CLI parse: clap types for fsync. No behavior; definitions only.

use crate::config::ConfigOverrides;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// fsync - mirror a local directory tree onto an FTP server
#[derive(Parser, Debug)]
#[command(name = "fsync")]
#[command(
    about = "Syncs local files to a target (FTP server). Local is master: local changes are mirrored."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (replaces the global and working-directory files)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mirror the source directory onto the target
    Sync {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Show the plan without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Do not ask before deleting on the target
        #[arg(long, short)]
        yes: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Show what a sync would do (same as `sync --dry-run`)
    Plan {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Print the effective configuration (password redacted)
    Config {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
}

/// Parameters that overwrite settings from the config file
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Source directory to sync
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Sync target host or IP address
    #[arg(long)]
    pub target: Option<String>,

    /// Path to target directory
    #[arg(long)]
    pub target_dir: Option<String>,

    /// FTP port
    #[arg(long)]
    pub port: Option<u16>,

    /// FTP user
    #[arg(long)]
    pub user: Option<String>,
}

impl From<&OverrideArgs> for ConfigOverrides {
    fn from(args: &OverrideArgs) -> Self {
        ConfigOverrides {
            source_dir: args.source_dir.clone(),
            target: args.target.clone(),
            target_dir: args.target_dir.clone(),
            port: args.port,
            user: args.user.clone(),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}
