//! Local directory transport (`protocol = "file"`)
//!
//! Mirrors into a directory on a locally mounted filesystem. Target-side
//! symlinks are listed as files so they get replaced or deleted instead of
//! being followed.

use crate::error::RemoteError;
use crate::transport::RemoteTransport;
use crate::tree::node::{EntryKind, ListedEntry};
use crate::tree::walker::list_local_directory;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct LocalDirTransport;

impl LocalDirTransport {
    pub fn new() -> Self {
        Self
    }
}

fn io_error(path: &str, err: std::io::Error) -> RemoteError {
    match err.kind() {
        ErrorKind::NotFound => RemoteError::NotFound(path.to_string()),
        ErrorKind::AlreadyExists => RemoteError::AlreadyExists(path.to_string()),
        _ => RemoteError::Rejected {
            path: path.to_string(),
            message: err.to_string(),
        },
    }
}

impl RemoteTransport for LocalDirTransport {
    fn list_directory(&mut self, path: &str) -> Result<Vec<ListedEntry>, RemoteError> {
        let entries = list_local_directory(Path::new(path)).map_err(|e| match e.into_io_error() {
            Some(io) => io_error(path, io),
            None => RemoteError::Rejected {
                path: path.to_string(),
                message: "filesystem loop detected".to_string(),
            },
        })?;

        Ok(entries
            .into_iter()
            .map(|mut entry| {
                if entry.kind == EntryKind::Symlink {
                    entry.kind = EntryKind::File;
                }
                entry
            })
            .collect())
    }

    fn write_file(&mut self, path: &str, content: &[u8]) -> Result<(), RemoteError> {
        debug!(path = %path, bytes = content.len(), "Writing file");
        let target = Path::new(path);
        // Writing through a symlink or into a FIFO must never happen
        if let Ok(meta) = fs::symlink_metadata(target) {
            let file_type = meta.file_type();
            if !file_type.is_file() && !file_type.is_dir() {
                fs::remove_file(target).map_err(|e| io_error(path, e))?;
            }
        }
        fs::write(target, content).map_err(|e| io_error(path, e))
    }

    fn set_modified_time(&mut self, path: &str, modified: SystemTime) -> Result<(), RemoteError> {
        fs::File::options()
            .write(true)
            .open(path)
            .and_then(|file| file.set_modified(modified))
            .map_err(|e| io_error(path, e))
    }

    fn make_directory(&mut self, path: &str) -> Result<(), RemoteError> {
        debug!(path = %path, "Creating directory");
        match fs::create_dir(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if Path::new(path).is_dir() {
                    Err(RemoteError::AlreadyExists(path.to_string()))
                } else {
                    Err(RemoteError::Rejected {
                        path: path.to_string(),
                        message: "a non-directory entry is in the way".to_string(),
                    })
                }
            }
            Err(e) => Err(io_error(path, e)),
        }
    }

    fn remove_file(&mut self, path: &str) -> Result<(), RemoteError> {
        debug!(path = %path, "Removing file");
        fs::remove_file(path).map_err(|e| io_error(path, e))
    }

    fn remove_directory(&mut self, path: &str) -> Result<(), RemoteError> {
        debug!(path = %path, "Removing directory");
        fs::remove_dir(path).map_err(|e| io_error(path, e))
    }
}
