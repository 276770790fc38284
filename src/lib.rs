//! fsync: one-way directory mirroring
//!
//! Snapshots a local master tree and a remote target tree, diffs them into
//! an ordered plan and applies the plan through a remote transport (FTP or
//! a mounted directory), so the target ends up mirroring the master.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod sync;
pub mod transport;
pub mod tree;
