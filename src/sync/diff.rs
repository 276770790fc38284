//! Diff engine: compares a master snapshot against a target snapshot
//!
//! The plan is emitted in fixed phases so the ordering invariants hold
//! without a dependency graph:
//!
//! 0. replace: stale remote entries whose kind differs from the master
//!    (subtree deepest first)
//! 1. create directories, depth ascending
//! 2. upload new and changed files
//! 3. delete remote-only files
//! 4. remove remote-only directories, depth descending
//!
//! Ties within a phase are broken by lexicographic path order.

use crate::sync::plan::{Action, Plan};
use crate::tree::builder::Snapshot;
use crate::tree::node::{Node, NodeKind};
use crate::tree::path;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, instrument};

/// How modification times participate in change detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeComparison {
    /// Changed when the master copy is newer than the target copy
    Newer,
    /// Changed when the timestamps differ in either direction
    #[default]
    Differs,
    /// Size only
    Ignore,
}

/// Change-detection policy for files present on both sides.
///
/// Size always participates. Timestamps only count when both are known and
/// differ by more than `modify_window`, which absorbs coarse remote clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangePolicy {
    pub time_comparison: TimeComparison,
    pub modify_window: Duration,
}

impl Default for ChangePolicy {
    fn default() -> Self {
        Self {
            time_comparison: TimeComparison::default(),
            modify_window: Duration::from_secs(2),
        }
    }
}

impl ChangePolicy {
    pub fn file_changed(&self, local: &Node, remote: &Node) -> bool {
        if local.size != remote.size {
            return true;
        }
        match (local.modified_time, remote.modified_time) {
            (Some(local_time), Some(remote_time)) => {
                self.times_differ(local_time, remote_time)
            }
            _ => false,
        }
    }

    fn times_differ(&self, local: SystemTime, remote: SystemTime) -> bool {
        match self.time_comparison {
            TimeComparison::Ignore => false,
            TimeComparison::Newer => local
                .duration_since(remote)
                .map(|ahead| ahead > self.modify_window)
                .unwrap_or(false),
            TimeComparison::Differs => {
                let gap = local
                    .duration_since(remote)
                    .or_else(|_| remote.duration_since(local))
                    .unwrap_or_default();
                gap > self.modify_window
            }
        }
    }
}

/// Computes the plan converging a target snapshot onto a master snapshot
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    policy: ChangePolicy,
}

impl DiffEngine {
    pub fn new(policy: ChangePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ChangePolicy {
        &self.policy
    }

    #[instrument(skip_all, fields(local_nodes = local.len(), remote_nodes = remote.len()))]
    pub fn diff(&self, local: &Snapshot, remote: &Snapshot) -> Plan {
        let mut actions = Vec::new();

        // Phase 0: paths whose kind differs on the two sides
        let mut replaced: HashSet<&str> = HashSet::new();
        for remote_node in remote.iter() {
            let Some(local_node) = local.get(&remote_node.relative_path) else {
                continue;
            };
            if local_node.kind == remote_node.kind {
                continue;
            }
            debug!(path = %remote_node.relative_path, "Kind changed; replacing");
            match remote_node.kind {
                NodeKind::File => {
                    actions.push(Action::DeleteFile(remote_node.relative_path.clone()));
                }
                NodeKind::Directory => {
                    let mut subtree: Vec<&Node> =
                        remote.descendants(&remote_node.relative_path).collect();
                    sort_deepest_first(&mut subtree);
                    for node in subtree {
                        replaced.insert(node.relative_path.as_str());
                        actions.push(removal_for(node));
                    }
                    actions.push(Action::RemoveDirectory(remote_node.relative_path.clone()));
                }
            }
            replaced.insert(remote_node.relative_path.as_str());
        }

        // Phase 1: directories missing remotely, parents first
        let mut creates: Vec<&Node> = local
            .directories()
            .filter(|dir| remote.get_kind(&dir.relative_path, NodeKind::Directory).is_none())
            .collect();
        creates.sort_by(|a, b| {
            path::depth(&a.relative_path)
                .cmp(&path::depth(&b.relative_path))
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });
        actions.extend(
            creates
                .into_iter()
                .map(|dir| Action::CreateDirectory(dir.relative_path.clone())),
        );

        // Phase 2: new or changed files
        for file in local.files() {
            let needs_upload = match remote.get_kind(&file.relative_path, NodeKind::File) {
                None => true,
                Some(remote_file) => self.policy.file_changed(file, remote_file),
            };
            if needs_upload {
                actions.push(Action::UploadFile(file.relative_path.clone()));
            }
        }

        // Phase 3: files only present remotely
        for file in remote.files() {
            if replaced.contains(file.relative_path.as_str()) {
                continue;
            }
            if local.get_kind(&file.relative_path, NodeKind::File).is_none() {
                actions.push(Action::DeleteFile(file.relative_path.clone()));
            }
        }

        // Phase 4: directories only present remotely, children first
        let mut removals: Vec<&Node> = remote
            .directories()
            .filter(|dir| !replaced.contains(dir.relative_path.as_str()))
            .filter(|dir| local.get_kind(&dir.relative_path, NodeKind::Directory).is_none())
            .collect();
        sort_deepest_first(&mut removals);
        actions.extend(
            removals
                .into_iter()
                .map(|dir| Action::RemoveDirectory(dir.relative_path.clone())),
        );

        let plan = Plan::new(actions);
        let summary = plan.summary();
        info!(
            create_directories = summary.create_directories,
            uploads = summary.uploads,
            deletes = summary.deletes,
            remove_directories = summary.remove_directories,
            "Plan computed"
        );
        plan
    }
}

fn sort_deepest_first(nodes: &mut [&Node]) {
    nodes.sort_by(|a, b| {
        path::depth(&b.relative_path)
            .cmp(&path::depth(&a.relative_path))
            .then_with(|| a.relative_path.cmp(&b.relative_path))
    });
}

fn removal_for(node: &Node) -> Action {
    match node.kind {
        NodeKind::File => Action::DeleteFile(node.relative_path.clone()),
        NodeKind::Directory => Action::RemoveDirectory(node.relative_path.clone()),
    }
}
