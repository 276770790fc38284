//! Tree snapshots
//!
//! Represents one side of the mirror (the local master tree or the remote
//! target tree) as an ordered map of relative paths to nodes, built by a
//! single depth-first traversal over a listing capability.

pub mod builder;
pub mod node;
pub mod path;
pub mod source;
pub mod walker;

pub use builder::{Snapshot, SnapshotBuilder};
pub use node::{EntryKind, ListedEntry, Node, NodeKind};
pub use source::{FileSource, TreeSource};
pub use walker::{LocalTree, WalkerConfig};
