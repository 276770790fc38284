//! Mirror engine: diff two snapshots into a plan and apply it
//!
//! Snapshots and plans are plain values. Only the executor talks to the
//! target.

pub mod diff;
pub mod executor;
pub mod mirror;
pub mod plan;

pub use diff::{ChangePolicy, DiffEngine, TimeComparison};
pub use executor::{ActionOutcome, Executor, OutcomeStatus, SyncReport};
pub use mirror::{Mirror, MirrorOptions, PreparedMirror};
pub use plan::{Action, Plan, PlanSummary};
