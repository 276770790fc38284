//! In-memory transport
//!
//! Holds a remote tree in memory and enforces the same preconditions a real
//! server does: parents must exist, only empty directories can be removed.
//! Failures can be scripted per operation and path, and every call is
//! recorded so tests can assert on ordering.

use crate::error::RemoteError;
use crate::transport::RemoteTransport;
use crate::tree::node::ListedEntry;
use std::collections::{BTreeMap, HashSet};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
enum MemoryEntry {
    Directory,
    File {
        content: Vec<u8>,
        modified: Option<SystemTime>,
    },
}

/// Remote tree held in memory, keyed by full remote path.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    entries: BTreeMap<String, MemoryEntry>,
    failures: HashSet<(String, String)>,
    calls: Vec<String>,
}

fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

fn name_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

impl MemoryTransport {
    /// Create a transport whose tree consists of the (empty) root directory
    pub fn new(root: &str) -> Self {
        let mut transport = Self::default();
        transport
            .entries
            .insert(crate::tree::path::normalize_remote_root(root), MemoryEntry::Directory);
        transport
    }

    pub fn add_directory(&mut self, path: &str) {
        self.entries.insert(path.to_string(), MemoryEntry::Directory);
    }

    pub fn add_file(&mut self, path: &str, content: &[u8], modified: Option<SystemTime>) {
        self.entries.insert(
            path.to_string(),
            MemoryEntry::File {
                content: content.to_vec(),
                modified,
            },
        );
    }

    /// Make `operation` ("list", "write", "mtime", "mkdir", "delete", "rmdir") on `path` fail
    pub fn fail_on(&mut self, operation: &str, path: &str) {
        self.failures
            .insert((operation.to_string(), path.to_string()));
    }

    /// Every call made so far, formatted as `"<operation> <path>"`
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    pub fn is_directory(&self, path: &str) -> bool {
        matches!(self.entries.get(path), Some(MemoryEntry::Directory))
    }

    pub fn file_content(&self, path: &str) -> Option<&[u8]> {
        match self.entries.get(path) {
            Some(MemoryEntry::File { content, .. }) => Some(content),
            _ => None,
        }
    }

    pub fn modified_time(&self, path: &str) -> Option<SystemTime> {
        match self.entries.get(path) {
            Some(MemoryEntry::File { modified, .. }) => *modified,
            _ => None,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    fn record(&mut self, operation: &str, path: &str) -> Result<(), RemoteError> {
        self.calls.push(format!("{} {}", operation, path));
        if self
            .failures
            .contains(&(operation.to_string(), path.to_string()))
        {
            return Err(RemoteError::Rejected {
                path: path.to_string(),
                message: "550 Permission denied".to_string(),
            });
        }
        Ok(())
    }

    fn children(&self, dir: &str) -> Vec<(&String, &MemoryEntry)> {
        self.entries
            .iter()
            .filter(|(key, _)| key.as_str() != dir && parent_of(key) == dir)
            .collect()
    }

    fn require_parent(&self, path: &str) -> Result<(), RemoteError> {
        let parent = parent_of(path);
        if parent.is_empty() || self.is_directory(&parent) {
            Ok(())
        } else {
            Err(RemoteError::Rejected {
                path: path.to_string(),
                message: "550 Parent directory does not exist".to_string(),
            })
        }
    }
}

impl RemoteTransport for MemoryTransport {
    fn list_directory(&mut self, path: &str) -> Result<Vec<ListedEntry>, RemoteError> {
        self.record("list", path)?;
        match self.entries.get(path) {
            Some(MemoryEntry::Directory) => {}
            Some(MemoryEntry::File { .. }) => {
                return Err(RemoteError::Rejected {
                    path: path.to_string(),
                    message: "550 Not a directory".to_string(),
                })
            }
            None => return Err(RemoteError::NotFound(path.to_string())),
        }

        Ok(self
            .children(path)
            .into_iter()
            .map(|(key, entry)| match entry {
                MemoryEntry::Directory => ListedEntry::directory(name_of(key)),
                MemoryEntry::File { content, modified } => {
                    ListedEntry::file(name_of(key), content.len() as u64, *modified)
                }
            })
            .collect())
    }

    fn write_file(&mut self, path: &str, content: &[u8]) -> Result<(), RemoteError> {
        self.record("write", path)?;
        self.require_parent(path)?;
        if self.is_directory(path) {
            return Err(RemoteError::Rejected {
                path: path.to_string(),
                message: "550 Is a directory".to_string(),
            });
        }
        // Servers stamp new files with the upload time
        self.add_file(path, content, Some(SystemTime::now()));
        Ok(())
    }

    fn set_modified_time(&mut self, path: &str, modified: SystemTime) -> Result<(), RemoteError> {
        self.record("mtime", path)?;
        match self.entries.get_mut(path) {
            Some(MemoryEntry::File { modified: stamp, .. }) => {
                *stamp = Some(modified);
                Ok(())
            }
            Some(MemoryEntry::Directory) => Err(RemoteError::Rejected {
                path: path.to_string(),
                message: "550 Is a directory".to_string(),
            }),
            None => Err(RemoteError::NotFound(path.to_string())),
        }
    }

    fn make_directory(&mut self, path: &str) -> Result<(), RemoteError> {
        self.record("mkdir", path)?;
        match self.entries.get(path) {
            Some(MemoryEntry::Directory) => Err(RemoteError::AlreadyExists(path.to_string())),
            Some(MemoryEntry::File { .. }) => Err(RemoteError::Rejected {
                path: path.to_string(),
                message: "550 File exists".to_string(),
            }),
            None => {
                self.require_parent(path)?;
                self.add_directory(path);
                Ok(())
            }
        }
    }

    fn remove_file(&mut self, path: &str) -> Result<(), RemoteError> {
        self.record("delete", path)?;
        match self.entries.get(path) {
            Some(MemoryEntry::File { .. }) => {
                self.entries.remove(path);
                Ok(())
            }
            Some(MemoryEntry::Directory) => Err(RemoteError::Rejected {
                path: path.to_string(),
                message: "550 Is a directory".to_string(),
            }),
            None => Err(RemoteError::NotFound(path.to_string())),
        }
    }

    fn remove_directory(&mut self, path: &str) -> Result<(), RemoteError> {
        self.record("rmdir", path)?;
        match self.entries.get(path) {
            Some(MemoryEntry::Directory) => {
                if !self.children(path).is_empty() {
                    return Err(RemoteError::Rejected {
                        path: path.to_string(),
                        message: "550 Directory not empty".to_string(),
                    });
                }
                self.entries.remove(path);
                Ok(())
            }
            Some(MemoryEntry::File { .. }) => Err(RemoteError::Rejected {
                path: path.to_string(),
                message: "550 Not a directory".to_string(),
            }),
            None => Err(RemoteError::NotFound(path.to_string())),
        }
    }
}
