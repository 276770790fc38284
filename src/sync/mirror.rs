//! One mirror run: snapshot both sides, diff, then execute
//!
//! The local snapshot is built on a scoped worker thread while the remote
//! tree is listed on the calling thread. Applying the plan is sequential.

use crate::error::{SyncError, TraversalError};
use crate::sync::diff::{ChangePolicy, DiffEngine};
use crate::sync::executor::{ActionOutcome, Executor, SyncReport};
use crate::sync::plan::Plan;
use crate::transport::{RemoteTransport, RemoteTree};
use crate::tree::builder::{Snapshot, SnapshotBuilder};
use crate::tree::walker::{LocalTree, WalkerConfig};
use std::thread;
use tracing::{info, instrument};

/// Knobs shared by the snapshot and diff stages
#[derive(Debug, Clone, Default)]
pub struct MirrorOptions {
    pub walker: WalkerConfig,
    pub policy: ChangePolicy,
}

/// Both snapshots and the plan converging one onto the other
#[derive(Debug, Clone)]
pub struct PreparedMirror {
    pub local: Snapshot,
    pub remote: Snapshot,
    pub plan: Plan,
}

/// Mirrors a local master tree onto a target root
#[derive(Debug, Clone)]
pub struct Mirror {
    local: LocalTree,
    target_root: String,
    options: MirrorOptions,
}

impl Mirror {
    pub fn new(local: LocalTree, target_root: &str, options: MirrorOptions) -> Self {
        Self {
            local,
            target_root: target_root.to_string(),
            options,
        }
    }

    /// Build both snapshots and compute the plan. Nothing is modified.
    #[instrument(skip_all, fields(local_root = %self.local.root().display(), target_root = %self.target_root))]
    pub fn prepare<T: RemoteTransport + ?Sized>(
        &self,
        transport: &mut T,
    ) -> Result<PreparedMirror, SyncError> {
        let local_builder = SnapshotBuilder::new(self.options.walker.clone());
        // Empty-directory pruning is a master-side choice; the target is taken as it is.
        let remote_builder = SnapshotBuilder::new(WalkerConfig {
            skip_empty_directories: false,
            ..self.options.walker.clone()
        });

        let (local, remote) = thread::scope(|scope| {
            let worker = scope.spawn(|| {
                let mut source = self.local.clone();
                local_builder.build(&mut source, "local")
            });

            let mut remote_tree = RemoteTree::new(transport, &self.target_root);
            let remote = remote_builder.build(&mut remote_tree, "remote");

            let local = worker.join().unwrap_or_else(|_| {
                Err(TraversalError::new(
                    self.local.root().display().to_string(),
                    "local traversal worker panicked",
                ))
            });
            (local, remote)
        });
        let local = local?;
        let remote = remote?;

        let plan = DiffEngine::new(self.options.policy).diff(&local, &remote);
        info!(
            local_nodes = local.len(),
            remote_nodes = remote.len(),
            actions = plan.len(),
            "Mirror prepared"
        );
        Ok(PreparedMirror {
            local,
            remote,
            plan,
        })
    }

    /// Execute a prepared plan
    pub fn apply<T, O>(&self, prepared: &PreparedMirror, transport: &mut T, observer: O) -> SyncReport
    where
        T: RemoteTransport + ?Sized,
        O: FnMut(&ActionOutcome),
    {
        Executor::new(&self.target_root).execute(&prepared.plan, &self.local, transport, observer)
    }

    /// Prepare and apply in one go
    pub fn run<T, O>(&self, transport: &mut T, observer: O) -> Result<SyncReport, SyncError>
    where
        T: RemoteTransport + ?Sized,
        O: FnMut(&ActionOutcome),
    {
        let prepared = self.prepare(transport)?;
        Ok(self.apply(&prepared, transport, observer))
    }
}
