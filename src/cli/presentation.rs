//! CLI presentation: text and json formatters for plans, outcomes and reports.

use crate::cli::parse::ConfigFormat;
use crate::config::FsyncConfig;
use crate::error::SyncError;
use crate::sync::executor::{ActionOutcome, OutcomeStatus, SyncReport};
use crate::sync::mirror::PreparedMirror;
use crate::sync::plan::Action;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

/// Longest path shown in full
pub const MAX_PATH_WIDTH: usize = 77;

/// Shorten long paths to their last [`MAX_PATH_WIDTH`] characters.
pub fn shorten_path(path: &str) -> String {
    let count = path.chars().count();
    if count <= MAX_PATH_WIDTH {
        return path.to_string();
    }
    let tail: String = path.chars().skip(count - MAX_PATH_WIDTH).collect();
    format!("...{}", tail)
}

/// Bytes to megabytes (MiB), rounded to two decimals
pub fn bytes_to_mbytes(bytes: u64) -> f64 {
    let size = bytes as f64 / (1u64 << 20) as f64;
    (size * 100.0).round() / 100.0
}

fn upload_size(prepared: &PreparedMirror, path: &str) -> u64 {
    prepared.local.get(path).map(|node| node.size).unwrap_or(0)
}

/// Plan listing: additions first, then removals
pub fn format_plan_text(prepared: &PreparedMirror) -> String {
    let mut additions = Vec::new();
    let mut removals = Vec::new();

    for action in &prepared.plan {
        let shown = shorten_path(action.path());
        match action {
            Action::CreateDirectory(_) => additions.push(format!("+ {}/", shown)),
            Action::UploadFile(p) => additions.push(format!(
                "+ {} ({:.2} MB)",
                shown,
                bytes_to_mbytes(upload_size(prepared, p))
            )),
            Action::DeleteFile(_) => removals.push(format!("- {}", shown)),
            Action::RemoveDirectory(_) => removals.push(format!("d {}/", shown)),
        }
    }

    let mut lines = vec!["Files to sync to target:".to_string()];
    if additions.is_empty() {
        lines.push("! Nothing to sync".to_string());
    }
    lines.extend(additions);
    lines.push("Files/directories to remove on target:".to_string());
    if removals.is_empty() {
        lines.push("! Nothing to remove".to_string());
    }
    lines.extend(removals);
    lines.join("\n")
}

/// One line per executed action
pub fn format_outcome_line(outcome: &ActionOutcome, color: bool) -> String {
    let subject = format!("{} {}", outcome.action.verb(), shorten_path(outcome.action.path()));
    let (tag, detail) = match &outcome.status {
        OutcomeStatus::Applied if outcome.bytes > 0 => (
            "ok",
            format!(" ({:.2} MB)", bytes_to_mbytes(outcome.bytes)),
        ),
        OutcomeStatus::Applied => ("ok", String::new()),
        OutcomeStatus::Tolerated { reason } => ("ok", format!(" ({})", reason)),
        OutcomeStatus::Failed { error } => ("FAILED", format!(": {}", error)),
        OutcomeStatus::Skipped { failed_parent } => (
            "skipped",
            format!(": parent '{}' could not be created", failed_parent),
        ),
    };

    let tag = format!("[{}]", tag);
    let tag = if !color {
        tag
    } else {
        match &outcome.status {
            OutcomeStatus::Failed { .. } => tag.red().to_string(),
            OutcomeStatus::Skipped { .. } => tag.yellow().to_string(),
            _ => tag.green().to_string(),
        }
    };
    format!("{} {}{}", tag, subject, detail)
}

/// Summary table and the final verdict line
pub fn format_report_text(report: &SyncReport, color: bool) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Outcome", "Actions"]);
    table.add_row(vec!["Applied".to_string(), report.applied_count().to_string()]);
    table.add_row(vec![
        "Already in place".to_string(),
        report.tolerated_count().to_string(),
    ]);
    table.add_row(vec!["Failed".to_string(), report.failed_count().to_string()]);
    table.add_row(vec!["Skipped".to_string(), report.skipped_count().to_string()]);

    let verdict = if report.is_success() {
        let line = "Fully synchronized.".to_string();
        if color {
            line.green().to_string()
        } else {
            line
        }
    } else {
        let problems = report.failed_count() + report.skipped_count();
        let line = format!("Synchronized with {} failures.", problems);
        if color {
            line.red().to_string()
        } else {
            line
        }
    };

    format!(
        "{}\nSync took {:.2}s ({:.2} MB transferred)\n{}",
        table,
        report.elapsed.as_secs_f64(),
        bytes_to_mbytes(report.bytes_transferred),
        verdict
    )
}

/// Machine-readable plan and, after execution, the report
pub fn format_json(
    prepared: &PreparedMirror,
    report: Option<&SyncReport>,
) -> Result<String, SyncError> {
    let value = json!({
        "local_nodes": prepared.local.len(),
        "remote_nodes": prepared.remote.len(),
        "upload_bytes": prepared
            .plan
            .iter()
            .filter(|a| matches!(a, Action::UploadFile(_)))
            .map(|a| upload_size(prepared, a.path()))
            .sum::<u64>(),
        "summary": prepared.plan.summary(),
        "plan": &prepared.plan,
        "report": report,
        "success": report.map(SyncReport::is_success),
    });
    serde_json::to_string_pretty(&value)
        .map_err(|e| SyncError::Config(format!("Failed to serialize output: {}", e)))
}

/// Effective configuration, password redacted
pub fn format_config(config: &FsyncConfig, format: ConfigFormat) -> Result<String, SyncError> {
    let shown = config.redacted();
    match format {
        ConfigFormat::Toml => toml::to_string_pretty(&shown)
            .map_err(|e| SyncError::Config(format!("Failed to serialize config: {}", e))),
        ConfigFormat::Json => serde_json::to_string_pretty(&shown)
            .map_err(|e| SyncError::Config(format!("Failed to serialize config: {}", e))),
    }
}
