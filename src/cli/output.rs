//! CLI output: error mapping and exit codes.

use crate::error::SyncError;

/// Every action applied or already in place
pub const EXIT_SYNCHRONIZED: i32 = 0;
/// The run completed but some actions failed or were skipped
pub const EXIT_PARTIAL_FAILURE: i32 = 1;
/// The run could not start or was aborted
pub const EXIT_RUN_ERROR: i32 = 2;

/// Map run-level errors to a string for CLI output.
pub fn map_error(e: &SyncError) -> String {
    match e {
        SyncError::Cancelled(reason) => format!("Aborted: {}", reason),
        other => format!("Error: {}", other),
    }
}

/// What a command printed and how the process should exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exit_code: EXIT_SYNCHRONIZED,
        }
    }
}
