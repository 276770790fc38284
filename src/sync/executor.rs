//! Action executor: applies a plan through a remote transport
//!
//! Execution is best-effort. A failed action is recorded and the run moves
//! on, except that creations and uploads below a directory whose creation
//! failed are skipped, since they cannot succeed.

use crate::error::{ActionError, RemoteError, RemoteWriteError, TransferError};
use crate::sync::plan::{Action, Plan};
use crate::transport::RemoteTransport;
use crate::tree::path;
use crate::tree::source::FileSource;
use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// What happened to one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Applied,
    /// The remote was already in the desired state
    Tolerated { reason: &'static str },
    Failed {
        #[serde(serialize_with = "error_message")]
        error: ActionError,
    },
    /// Not attempted because creating an enclosing directory failed
    Skipped { failed_parent: String },
}

impl OutcomeStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, OutcomeStatus::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, OutcomeStatus::Skipped { .. })
    }
}

fn error_message<S: Serializer>(err: &ActionError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    #[serde(flatten)]
    pub action: Action,
    #[serde(flatten)]
    pub status: OutcomeStatus,
    /// Bytes sent to the target (uploads only)
    pub bytes: u64,
}

/// Result of applying a whole plan
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub outcomes: Vec<ActionOutcome>,
    pub bytes_transferred: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "duration_millis")]
    pub elapsed: Duration,
}

fn duration_millis<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(d.as_millis() as u64)
}

impl SyncReport {
    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failed())
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_skipped()).count()
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Applied)
            .count()
    }

    pub fn tolerated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Tolerated { .. }))
            .count()
    }

    /// True when nothing failed or was skipped
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0 && self.skipped_count() == 0
    }
}

/// Applies plans against one target root
#[derive(Debug, Clone)]
pub struct Executor {
    target_root: String,
}

impl Executor {
    pub fn new(target_root: &str) -> Self {
        Self {
            target_root: path::normalize_remote_root(target_root),
        }
    }

    /// Apply every action in plan order, reporting each outcome to `observer`
    /// as soon as it is known.
    #[instrument(skip_all, fields(actions = plan.len(), target_root = %self.target_root))]
    pub fn execute<F, T, O>(
        &self,
        plan: &Plan,
        source: &F,
        transport: &mut T,
        mut observer: O,
    ) -> SyncReport
    where
        F: FileSource + ?Sized,
        T: RemoteTransport + ?Sized,
        O: FnMut(&ActionOutcome),
    {
        let started = Instant::now();
        let mut report = SyncReport::default();
        let mut failed_directories: Vec<String> = Vec::new();

        for action in plan {
            let blocked_by = match action {
                Action::CreateDirectory(p) | Action::UploadFile(p) => failed_directories
                    .iter()
                    .find(|dir| path::is_within(p, dir))
                    .cloned(),
                _ => None,
            };

            let outcome = match blocked_by {
                Some(failed_parent) => {
                    warn!(action = action.verb(), path = %action.path(), failed_parent = %failed_parent, "Skipped");
                    ActionOutcome {
                        action: action.clone(),
                        status: OutcomeStatus::Skipped { failed_parent },
                        bytes: 0,
                    }
                }
                None => self.apply(action, source, transport),
            };

            if let (Action::CreateDirectory(dir), OutcomeStatus::Failed { .. }) =
                (action, &outcome.status)
            {
                failed_directories.push(dir.clone());
            }

            report.bytes_transferred += outcome.bytes;
            observer(&outcome);
            report.outcomes.push(outcome);
        }

        report.elapsed = started.elapsed();
        info!(
            applied = report.applied_count(),
            tolerated = report.tolerated_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            bytes = report.bytes_transferred,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Plan executed"
        );
        report
    }

    fn apply<F, T>(&self, action: &Action, source: &F, transport: &mut T) -> ActionOutcome
    where
        F: FileSource + ?Sized,
        T: RemoteTransport + ?Sized,
    {
        let remote = path::remote_path(&self.target_root, action.path());
        debug!(action = action.verb(), remote = %remote, "Applying");

        let result: Result<(OutcomeStatus, u64), ActionError> = match action {
            Action::CreateDirectory(_) => match transport.make_directory(&remote) {
                Ok(()) => Ok((OutcomeStatus::Applied, 0)),
                Err(RemoteError::AlreadyExists(_)) => Ok((
                    OutcomeStatus::Tolerated {
                        reason: "already exists",
                    },
                    0,
                )),
                Err(e) => Err(rejected("mkdir", action, e)),
            },
            Action::UploadFile(relative) => upload(relative, &remote, source, transport),
            Action::DeleteFile(_) => removal(transport.remove_file(&remote), "delete", action),
            Action::RemoveDirectory(_) => {
                removal(transport.remove_directory(&remote), "rmdir", action)
            }
        };

        let (status, bytes) = match result {
            Ok((status, bytes)) => {
                match &status {
                    OutcomeStatus::Tolerated { reason } => {
                        warn!(action = action.verb(), path = %action.path(), reason = %reason, "Tolerated")
                    }
                    _ => info!(action = action.verb(), path = %action.path(), bytes, "Applied"),
                }
                (status, bytes)
            }
            Err(e) => {
                error!(action = action.verb(), path = %action.path(), error = %e, "Action failed");
                (OutcomeStatus::Failed { error: e }, 0)
            }
        };

        ActionOutcome {
            action: action.clone(),
            status,
            bytes,
        }
    }
}

fn upload<F, T>(
    relative: &str,
    remote: &str,
    source: &F,
    transport: &mut T,
) -> Result<(OutcomeStatus, u64), ActionError>
where
    F: FileSource + ?Sized,
    T: RemoteTransport + ?Sized,
{
    let content = source.read_file(relative).map_err(|e| TransferError {
        path: relative.to_string(),
        reason: format!("cannot read local file: {}", e),
    })?;
    transport
        .write_file(remote, &content)
        .map_err(|e| TransferError {
            path: relative.to_string(),
            reason: e.to_string(),
        })?;

    // Without the master's mtime the next run would see the upload time and re-upload.
    if let Some(modified) = source.modified_time(relative) {
        if let Err(e) = transport.set_modified_time(remote, modified) {
            warn!(path = %relative, error = %e, "Cannot set modification time on target");
        }
    }
    Ok((OutcomeStatus::Applied, content.len() as u64))
}

fn removal(
    result: Result<(), RemoteError>,
    operation: &'static str,
    action: &Action,
) -> Result<(OutcomeStatus, u64), ActionError> {
    match result {
        Ok(()) => Ok((OutcomeStatus::Applied, 0)),
        Err(RemoteError::NotFound(_)) => Ok((
            OutcomeStatus::Tolerated {
                reason: "already absent",
            },
            0,
        )),
        Err(e) => Err(rejected(operation, action, e)),
    }
}

fn rejected(operation: &'static str, action: &Action, err: RemoteError) -> ActionError {
    RemoteWriteError {
        operation,
        path: action.path().to_string(),
        reason: err.to_string(),
    }
    .into()
}
