//! fsync CLI Binary
//!
//! Mirrors a local directory onto an FTP server (or a mounted directory).
//! Exit codes: 0 synchronized, 1 synchronized with failures, 2 run error.

use anyhow::Context;
use clap::Parser;
use fsync::cli::{map_error, Cli, RunContext, EXIT_RUN_ERROR};
use fsync::config::{ConfigLoader, ConfigOverrides};
use fsync::logging::{init_logging, LoggingConfig};
use std::path::Path;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_RUN_ERROR
        }
    };
    process::exit(code);
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let working_dir = std::env::current_dir().context("Cannot determine working directory")?;

    let logging_config = build_logging_config(cli, &working_dir);
    init_logging(&logging_config).context("Failed to initialize logging")?;

    info!("fsync starting");

    let context = RunContext::new(working_dir, cli.config.clone());
    match context.execute(&cli.command) {
        Ok(output) => {
            info!(exit_code = output.exit_code, "Command completed");
            println!("{}", output.text);
            Ok(output.exit_code)
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            Ok(EXIT_RUN_ERROR)
        }
    }
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli, working_dir: &Path) -> LoggingConfig {
    let mut config = ConfigLoader::load_with(
        working_dir,
        cli.config.as_deref(),
        &ConfigOverrides::default(),
    )
    .map(|c| c.logging)
    .unwrap_or_default();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
        if config.output == "file" {
            config.output = "file+stderr".to_string();
        }
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
