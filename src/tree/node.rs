//! Snapshot nodes and raw directory listing entries

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Kind of a node that takes part in the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// Kind of a raw entry as reported by a listing capability.
///
/// Symlinks are distinguishable here so the snapshot builder can drop them
/// before a [`Node`] is ever created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// One entry returned by `list_directory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl ListedEntry {
    pub fn file(name: impl Into<String>, size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
            modified,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: 0,
            modified: None,
        }
    }

    pub fn symlink(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Symlink,
            size: 0,
            modified: None,
        }
    }
}

/// One filesystem entry inside a snapshot, keyed by its relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Slash-separated path from the tree root
    pub relative_path: String,
    pub kind: NodeKind,
    /// Byte length; always 0 for directories
    pub size: u64,
    /// Last modification; `None` for directories and for remote entries
    /// whose listing carried no timestamp
    pub modified_time: Option<SystemTime>,
}

impl Node {
    pub fn file(
        relative_path: impl Into<String>,
        size: u64,
        modified_time: Option<SystemTime>,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: NodeKind::File,
            size,
            modified_time,
        }
    }

    pub fn directory(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: NodeKind::Directory,
            size: 0,
            modified_time: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}
