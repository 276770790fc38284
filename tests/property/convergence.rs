//! Property-based tests over generated master/target tree pairs

use fsync::sync::{DiffEngine, Executor};
use fsync::transport::{MemoryTransport, RemoteTree};
use fsync::tree::{FileSource, Node, NodeKind, Snapshot, SnapshotBuilder, WalkerConfig};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::io;

const ROOT: &str = "/mirror";

/// Entry paths drawn from a tiny alphabet so the two sides overlap a lot
fn entry() -> impl Strategy<Value = (Vec<u8>, bool, u64)> {
    (
        prop::collection::vec(0u8..3, 1..4),
        any::<bool>(),
        0u64..4,
    )
}

fn tree() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec(entry(), 0..12).prop_map(materialize)
}

/// Turn generated entries into a consistent snapshot: every ancestor is a
/// directory, and a path that is some entry's ancestor is a directory too.
fn materialize(entries: Vec<(Vec<u8>, bool, u64)>) -> Snapshot {
    let mut kinds: BTreeMap<String, (NodeKind, u64)> = BTreeMap::new();
    let mut ancestors = BTreeSet::new();

    for (components, is_dir, size) in entries {
        let names: Vec<String> = components.iter().map(|c| format!("n{}", c)).collect();
        for depth in 1..names.len() {
            ancestors.insert(names[..depth].join("/"));
        }
        let path = names.join("/");
        let kind = if is_dir {
            NodeKind::Directory
        } else {
            NodeKind::File
        };
        kinds.entry(path).or_insert((kind, size));
    }
    for dir in ancestors {
        kinds.insert(dir, (NodeKind::Directory, 0));
    }

    kinds
        .into_iter()
        .map(|(path, (kind, size))| match kind {
            NodeKind::Directory => Node::directory(path),
            NodeKind::File => Node::file(path, size, None),
        })
        .collect()
}

/// Serves zero-filled content of each local file's recorded size
struct SizedContent<'a>(&'a Snapshot);

impl FileSource for SizedContent<'_> {
    fn read_file(&self, relative_path: &str) -> io::Result<Vec<u8>> {
        self.0
            .get(relative_path)
            .filter(|node| node.is_file())
            .map(|node| vec![0u8; node.size as usize])
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, relative_path.to_string()))
    }
}

fn transport_holding(snapshot: &Snapshot) -> MemoryTransport {
    let mut transport = MemoryTransport::new(ROOT);
    for node in snapshot.iter() {
        let full = format!("{}/{}", ROOT, node.relative_path);
        match node.kind {
            NodeKind::Directory => transport.add_directory(&full),
            NodeKind::File => transport.add_file(&full, &vec![1u8; node.size as usize], None),
        }
    }
    transport
}

fn fresh_snapshot(transport: &mut MemoryTransport) -> Snapshot {
    let mut tree = RemoteTree::new(transport, ROOT);
    SnapshotBuilder::new(WalkerConfig::default())
        .build(&mut tree, "remote")
        .unwrap()
}

fn shape(snapshot: &Snapshot) -> BTreeSet<(String, NodeKind, u64)> {
    snapshot
        .iter()
        .map(|n| (n.relative_path.clone(), n.kind, n.size))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn plan_always_respects_ordering(local in tree(), remote in tree()) {
        let plan = DiffEngine::default().diff(&local, &remote);
        prop_assert_eq!(plan.check_order(), Ok(()));
    }

    #[test]
    fn applying_plan_converges_and_second_plan_is_empty(local in tree(), remote in tree()) {
        let engine = DiffEngine::default();
        let plan = engine.diff(&local, &remote);
        let mut transport = transport_holding(&remote);

        let report = Executor::new(ROOT).execute(&plan, &SizedContent(&local), &mut transport, |_| {});
        prop_assert!(report.is_success(), "failures: {:?}", report.failures().collect::<Vec<_>>());

        let after = fresh_snapshot(&mut transport);
        prop_assert_eq!(shape(&after), shape(&local));
        prop_assert!(engine.diff(&local, &after).is_empty());
    }

    #[test]
    fn no_action_touches_paths_absent_from_both_sides(local in tree(), remote in tree()) {
        let plan = DiffEngine::default().diff(&local, &remote);
        for action in &plan {
            prop_assert!(local.contains(action.path()) || remote.contains(action.path()));
        }
    }
}

/// Running the diff twice on the same inputs gives the same plan
#[test]
fn test_plan_is_deterministic() {
    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(&(tree(), tree()), |(local, remote)| {
            let engine = DiffEngine::default();
            assert_eq!(engine.diff(&local, &remote), engine.diff(&local, &remote));
            Ok(())
        })
        .unwrap();
}
