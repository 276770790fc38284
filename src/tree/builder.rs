//! Snapshot builder for constructing comparable tree snapshots

use crate::error::TraversalError;
use crate::tree::node::{EntryKind, Node, NodeKind};
use crate::tree::path;
use crate::tree::source::TreeSource;
use crate::tree::walker::WalkerConfig;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

/// Structural snapshot of one tree.
///
/// Keys are ordered lexicographically, so a directory `P` always precedes
/// every node under `P/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    nodes: BTreeMap<String, Node>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing any node already stored under its path
    pub fn insert(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.relative_path.clone(), node)
    }

    pub fn get(&self, relative_path: &str) -> Option<&Node> {
        self.nodes.get(relative_path)
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.nodes.contains_key(relative_path)
    }

    /// Node at `relative_path` if it has the given kind
    pub fn get_kind(&self, relative_path: &str, kind: NodeKind) -> Option<&Node> {
        self.nodes.get(relative_path).filter(|node| node.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in path order
    pub fn iter(&self) -> btree_map::Values<'_, String, Node> {
        self.nodes.values()
    }

    pub fn files(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|node| node.is_file())
    }

    pub fn directories(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|node| node.is_directory())
    }

    /// Nodes strictly below the directory `dir`, in path order
    pub fn descendants<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        let start = format!("{}/", dir);
        self.nodes
            .range(start..)
            .take_while(move |(key, _)| path::is_within(key, dir))
            .map(|(_, node)| node)
    }

    /// Sum of all file sizes
    pub fn total_file_bytes(&self) -> u64 {
        self.files().map(|node| node.size).sum()
    }
}

impl FromIterator<Node> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for node in iter {
            snapshot.insert(node);
        }
        snapshot
    }
}

/// Builds a [`Snapshot`] by a depth-first walk over a [`TreeSource`].
pub struct SnapshotBuilder {
    config: WalkerConfig,
}

impl SnapshotBuilder {
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// Walk the whole tree and collect its nodes.
    ///
    /// Any directory that cannot be listed aborts the build; a subtree is
    /// never silently treated as empty.
    #[instrument(skip(self, source))]
    pub fn build<S: TreeSource + ?Sized>(
        &self,
        source: &mut S,
        side: &str,
    ) -> Result<Snapshot, TraversalError> {
        let start = Instant::now();
        info!("Starting snapshot build");

        let mut snapshot = Snapshot::new();
        self.walk(source, "", &mut snapshot)?;

        info!(
            node_count = snapshot.len(),
            total_bytes = snapshot.total_file_bytes(),
            duration_ms = start.elapsed().as_millis(),
            "Snapshot build completed"
        );
        Ok(snapshot)
    }

    /// Returns whether `dir` retained at least one descendant
    fn walk<S: TreeSource + ?Sized>(
        &self,
        source: &mut S,
        dir: &str,
        snapshot: &mut Snapshot,
    ) -> Result<bool, TraversalError> {
        let mut entries = source.list_directory(dir)?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(dir = %dir, entry_count = entries.len(), "Listed directory");

        let mut retained = false;
        for entry in entries {
            if entry.name.is_empty() || entry.name == "." || entry.name == ".." {
                continue;
            }
            if self.config.should_ignore(&entry.name) {
                trace!(dir = %dir, name = %entry.name, "Ignoring entry");
                continue;
            }

            let relative_path = path::join(dir, &entry.name);
            match entry.kind {
                EntryKind::Symlink => {
                    trace!(path = %relative_path, "Skipping symlink");
                }
                EntryKind::File => {
                    snapshot.insert(Node::file(relative_path, entry.size, entry.modified));
                    retained = true;
                }
                EntryKind::Directory => {
                    snapshot.insert(Node::directory(relative_path.clone()));
                    let has_children = self.walk(source, &relative_path, snapshot)?;
                    if !has_children && self.config.skip_empty_directories {
                        trace!(path = %relative_path, "Dropping empty directory");
                        snapshot.nodes.remove(&relative_path);
                    } else {
                        retained = true;
                    }
                }
            }
        }

        Ok(retained)
    }
}
