//! Remote transports
//!
//! The engine drives the target tree only through [`RemoteTransport`]. One
//! transport is one stateful connection; every call blocks and calls are
//! never issued concurrently.

pub mod ftp;
pub mod local;
pub mod memory;
pub mod mlsd;

use crate::config::{Protocol, TargetConfig};
use crate::error::{RemoteError, SyncError, TraversalError};
use crate::tree::node::{EntryKind, ListedEntry};
use crate::tree::path;
use crate::tree::source::TreeSource;
use std::time::SystemTime;
use tracing::info;

pub use ftp::FtpTransport;
pub use local::LocalDirTransport;
pub use memory::MemoryTransport;

/// Remote operations needed to snapshot and converge the target tree.
///
/// Paths are full remote paths (target root already joined).
pub trait RemoteTransport {
    fn list_directory(&mut self, path: &str) -> Result<Vec<ListedEntry>, RemoteError>;

    /// Write the whole content, replacing any existing file
    fn write_file(&mut self, path: &str, content: &[u8]) -> Result<(), RemoteError>;

    /// Stamp a file's modification time (whole seconds are enough)
    fn set_modified_time(&mut self, path: &str, modified: SystemTime) -> Result<(), RemoteError>;

    fn make_directory(&mut self, path: &str) -> Result<(), RemoteError>;

    fn remove_file(&mut self, path: &str) -> Result<(), RemoteError>;

    /// Remove an empty directory
    fn remove_directory(&mut self, path: &str) -> Result<(), RemoteError>;
}

impl<T: RemoteTransport + ?Sized> RemoteTransport for Box<T> {
    fn list_directory(&mut self, path: &str) -> Result<Vec<ListedEntry>, RemoteError> {
        (**self).list_directory(path)
    }

    fn write_file(&mut self, path: &str, content: &[u8]) -> Result<(), RemoteError> {
        (**self).write_file(path, content)
    }

    fn set_modified_time(&mut self, path: &str, modified: SystemTime) -> Result<(), RemoteError> {
        (**self).set_modified_time(path, modified)
    }

    fn make_directory(&mut self, path: &str) -> Result<(), RemoteError> {
        (**self).make_directory(path)
    }

    fn remove_file(&mut self, path: &str) -> Result<(), RemoteError> {
        (**self).remove_file(path)
    }

    fn remove_directory(&mut self, path: &str) -> Result<(), RemoteError> {
        (**self).remove_directory(path)
    }
}

/// The target tree seen through a transport, rooted at the target directory.
pub struct RemoteTree<'a, T: RemoteTransport + ?Sized> {
    transport: &'a mut T,
    root: String,
}

impl<'a, T: RemoteTransport + ?Sized> RemoteTree<'a, T> {
    pub fn new(transport: &'a mut T, root: &str) -> Self {
        Self {
            transport,
            root: path::normalize_remote_root(root),
        }
    }
}

impl<T: RemoteTransport + ?Sized> TreeSource for RemoteTree<'_, T> {
    fn list_directory(&mut self, relative_path: &str) -> Result<Vec<ListedEntry>, TraversalError> {
        let full_path = path::remote_path(&self.root, relative_path);
        let entries = self
            .transport
            .list_directory(&full_path)
            .map_err(|e| TraversalError::new(full_path.clone(), e))?;

        // A remote symlink is mirrored state like any file: it gets replaced or deleted.
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
}

/// Open the transport described by the target configuration.
pub fn connect(target: &TargetConfig) -> Result<Box<dyn RemoteTransport>, SyncError> {
    match target.protocol {
        Protocol::Ftp => {
            info!(host = %target.host, port = target.port, "Connecting to FTP target");
            Ok(Box::new(FtpTransport::connect(target)?))
        }
        Protocol::File => {
            info!(directory = %target.directory, "Using local directory target");
            Ok(Box::new(LocalDirTransport::new()))
        }
    }
}
