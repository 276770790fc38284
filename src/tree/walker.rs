//! Local filesystem walker for the master tree

use crate::error::TraversalError;
use crate::tree::node::{EntryKind, ListedEntry};
use crate::tree::source::{FileSource, TreeSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::trace;
use walkdir::WalkDir;

/// Name filtering applied while building snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Whether to keep entries whose name starts with `.` (default: false)
    #[serde(default)]
    pub include_hidden: bool,
    /// Exact entry names to ignore wherever they appear (e.g. "Thumbs.db")
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Drop directories that end up with no retained descendants
    #[serde(default)]
    pub skip_empty_directories: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            include_hidden: false,
            ignore_patterns: Vec::new(),
            skip_empty_directories: false,
        }
    }
}

impl WalkerConfig {
    /// Check if an entry name should be ignored
    pub fn should_ignore(&self, name: &str) -> bool {
        if !self.include_hidden && name.starts_with('.') {
            return true;
        }
        self.ignore_patterns.iter().any(|pattern| pattern == name)
    }
}

/// The master tree on the local filesystem.
///
/// Listing never follows symbolic links: they are reported as
/// [`EntryKind::Symlink`] and the snapshot builder drops them. Special files
/// (FIFOs, sockets, devices) are not listed at all.
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
}

impl LocalTree {
    /// Open a local tree, canonicalizing the root.
    ///
    /// Fails with a [`TraversalError`] if the root does not exist or is not a
    /// directory, since no plan can be built without a master tree.
    pub fn open(root: &Path) -> Result<Self, TraversalError> {
        let root = dunce::canonicalize(root)
            .map_err(|e| TraversalError::new(root.display().to_string(), e))?;
        if !root.is_dir() {
            return Err(TraversalError::new(
                root.display().to_string(),
                "not a directory",
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute local path of a snapshot key
    pub fn absolute(&self, relative_path: &str) -> PathBuf {
        relative_path
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl TreeSource for LocalTree {
    fn list_directory(&mut self, relative_path: &str) -> Result<Vec<ListedEntry>, TraversalError> {
        let dir = self.absolute(relative_path);
        list_local_directory(&dir).map_err(|e| {
            let display_path = if relative_path.is_empty() {
                self.root.display().to_string()
            } else {
                relative_path.to_string()
            };
            TraversalError::new(display_path, e)
        })
    }
}

/// List one local directory without following symbolic links.
///
/// Entries come back sorted by file name.
pub fn list_local_directory(dir: &Path) -> Result<Vec<ListedEntry>, walkdir::Error> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            trace!(name = %name, "Found symlink");
            entries.push(ListedEntry::symlink(name));
            continue;
        }

        if file_type.is_dir() {
            entries.push(ListedEntry::directory(name));
            continue;
        }

        // FIFOs, sockets and device nodes have no content to mirror
        if !file_type.is_file() {
            trace!(name = %name, "Skipping special file");
            continue;
        }

        let metadata = entry.metadata()?;
        entries.push(ListedEntry {
            name,
            kind: EntryKind::File,
            size: metadata.len(),
            modified: metadata.modified().ok(),
        });
    }

    Ok(entries)
}

impl FileSource for LocalTree {
    fn read_file(&self, relative_path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.absolute(relative_path))
    }

    fn modified_time(&self, relative_path: &str) -> Option<SystemTime> {
        std::fs::symlink_metadata(self.absolute(relative_path))
            .and_then(|meta| meta.modified())
            .ok()
    }
}
