//! CLI domain: parse, route, output, and presentation only.
//! No mirroring logic; single route table dispatches to the engine.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{
    map_error, CommandOutput, EXIT_PARTIAL_FAILURE, EXIT_RUN_ERROR, EXIT_SYNCHRONIZED,
};
pub use parse::{Cli, Commands, ConfigFormat, OverrideArgs, ReportFormat};
pub use presentation::{
    bytes_to_mbytes, format_config, format_json, format_outcome_line, format_plan_text,
    format_report_text, shorten_path,
};
pub use route::RunContext;
