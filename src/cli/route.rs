//! CLI route: single route table and run context. Dispatches to the mirror engine and presentation.

use crate::cli::output::{CommandOutput, EXIT_PARTIAL_FAILURE, EXIT_SYNCHRONIZED};
use crate::cli::parse::{Commands, ConfigFormat, OverrideArgs, ReportFormat};
use crate::cli::presentation::{
    format_config, format_json, format_outcome_line, format_plan_text, format_report_text,
};
use crate::config::{ConfigLoader, ConfigOverrides, FsyncConfig};
use crate::error::SyncError;
use crate::sync::mirror::{Mirror, MirrorOptions, PreparedMirror};
use crate::transport;
use crate::tree::walker::LocalTree;
use dialoguer::Confirm;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{info, warn};

/// Runtime context for CLI execution: working directory and config path.
/// Configuration is loaded per command through ConfigLoader only.
pub struct RunContext {
    working_dir: PathBuf,
    config_path: Option<PathBuf>,
    color: Option<bool>,
}

impl RunContext {
    pub fn new(working_dir: PathBuf, config_path: Option<PathBuf>) -> Self {
        Self {
            working_dir,
            config_path,
            color: None,
        }
    }

    /// Force colored output on or off instead of detecting a terminal
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = Some(color);
        self
    }

    pub fn load_config(&self, overrides: &OverrideArgs) -> Result<FsyncConfig, SyncError> {
        ConfigLoader::load_with(
            &self.working_dir,
            self.config_path.as_deref(),
            &ConfigOverrides::from(overrides),
        )
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, SyncError> {
        match command {
            Commands::Sync {
                overrides,
                dry_run,
                yes,
                format,
            } => self.handle_sync(overrides, *dry_run, *yes, *format),
            Commands::Plan { overrides, format } => self.handle_sync(overrides, true, true, *format),
            Commands::Config { overrides, format } => self.handle_config(overrides, *format),
        }
    }

    fn use_color(&self, config: &FsyncConfig) -> bool {
        self.color
            .unwrap_or_else(|| config.logging.color && std::io::stdout().is_terminal())
    }

    fn handle_sync(
        &self,
        overrides: &OverrideArgs,
        dry_run: bool,
        yes: bool,
        format: ReportFormat,
    ) -> Result<CommandOutput, SyncError> {
        let config = self.load_config(overrides)?;
        if let Err(errors) = config.validate() {
            return Err(SyncError::Validation(
                errors.iter().map(ToString::to_string).collect(),
            ));
        }
        let text = format == ReportFormat::Text;
        let color = self.use_color(&config);

        let local = LocalTree::open(&config.source.directory)?;
        let mut remote = transport::connect(&config.target)?;
        let mirror = Mirror::new(
            local,
            &config.target.directory,
            MirrorOptions {
                walker: config.sync.walker_config(),
                policy: config.sync.change_policy(),
            },
        );

        info!("Getting target directory content");
        let prepared = mirror.prepare(&mut remote)?;
        if text {
            println!("{}", format_plan_text(&prepared));
        }

        if prepared.plan.is_empty() || dry_run {
            let output = if !text {
                format_json(&prepared, None)?
            } else if prepared.plan.is_empty() {
                "Nothing to do: target is synchronized.".to_string()
            } else {
                "Dry run: nothing was changed.".to_string()
            };
            return Ok(CommandOutput::success(output));
        }

        confirm_plan(&prepared, &config, yes)?;

        info!(actions = prepared.plan.len(), "Syncing to target");
        let report = mirror.apply(&prepared, &mut remote, |outcome| {
            if text {
                println!("{}", format_outcome_line(outcome, color));
            }
        });

        let output = if text {
            format_report_text(&report, color)
        } else {
            format_json(&prepared, Some(&report))?
        };
        let exit_code = if report.is_success() {
            EXIT_SYNCHRONIZED
        } else {
            warn!(failed = report.failed_count(), skipped = report.skipped_count(), "Sync incomplete");
            EXIT_PARTIAL_FAILURE
        };
        Ok(CommandOutput {
            text: output,
            exit_code,
        })
    }

    fn handle_config(
        &self,
        overrides: &OverrideArgs,
        format: ConfigFormat,
    ) -> Result<CommandOutput, SyncError> {
        let config = self.load_config(overrides)?;
        Ok(CommandOutput::success(format_config(&config, format)?))
    }
}

/// Ask before destructive plans unless `--yes` was given
fn confirm_plan(prepared: &PreparedMirror, config: &FsyncConfig, yes: bool) -> Result<(), SyncError> {
    if yes {
        return Ok(());
    }

    let prompt = if prepared.local.is_empty() && !prepared.remote.is_empty() {
        "Local directory is empty. Delete everything on target?".to_string()
    } else if config.sync.confirm_deletions && prepared.plan.has_deletions() {
        let summary = prepared.plan.summary();
        format!(
            "Delete {} entries on target?",
            summary.deletes + summary.remove_directories
        )
    } else {
        return Ok(());
    };

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| {
            SyncError::Cancelled(format!(
                "cannot ask for confirmation ({}); pass --yes to proceed",
                e
            ))
        })?;

    if confirmed {
        Ok(())
    } else {
        Err(SyncError::Cancelled("declined by user".to_string()))
    }
}
