//! Integration tests for the fsync mirroring engine

mod cli_commands;
mod config_integration;
mod local_target;
mod mirror_scenarios;
