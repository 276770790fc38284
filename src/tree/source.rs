//! Traversal and content capabilities consumed by the engine

use crate::error::TraversalError;
use crate::tree::node::ListedEntry;
use std::time::SystemTime;

/// Directory listing capability for one tree.
///
/// Paths are relative to the tree root; `""` lists the root. Implemented by
/// [`crate::tree::LocalTree`] for the master tree and by
/// [`crate::transport::RemoteTree`] for the target tree.
pub trait TreeSource {
    fn list_directory(&mut self, relative_path: &str) -> Result<Vec<ListedEntry>, TraversalError>;
}

/// Read access to master file content for uploads.
pub trait FileSource {
    fn read_file(&self, relative_path: &str) -> std::io::Result<Vec<u8>>;

    /// Modification time to stamp on the uploaded copy, if known
    fn modified_time(&self, _relative_path: &str) -> Option<SystemTime> {
        None
    }
}
