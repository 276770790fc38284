//! Error types for the fsync mirroring engine.

use thiserror::Error;

/// A directory could not be enumerated on either side of the mirror.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cannot list directory '{path}': {reason}")]
pub struct TraversalError {
    pub path: String,
    pub reason: String,
}

impl TraversalError {
    pub fn new(path: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// An upload failed, either reading the local file or writing the remote one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Transfer of '{path}' failed: {reason}")]
pub struct TransferError {
    pub path: String,
    pub reason: String,
}

/// The remote side rejected a create, delete or remove for a non-tolerated reason.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Remote {operation} of '{path}' rejected: {reason}")]
pub struct RemoteWriteError {
    pub operation: &'static str,
    pub path: String,
    pub reason: String,
}

/// Typed failure of a single plan action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    RemoteWrite(#[from] RemoteWriteError),
}

/// Errors reported by a remote transport.
///
/// `NotFound` and `AlreadyExists` let the executor recognise the idempotent
/// cases; everything else is a real failure.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Rejected '{path}': {message}")]
    Rejected { path: String, message: String },

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Run-level failures that abort a mirror run before or instead of execution.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Connection to target failed: {0}")]
    Connection(String),

    #[error("Synchronization cancelled: {0}")]
    Cancelled(String),
}

impl From<config::ConfigError> for SyncError {
    fn from(err: config::ConfigError) -> Self {
        SyncError::Config(err.to_string())
    }
}
