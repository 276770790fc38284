//! Configuration sources, lowest precedence first: global file, working-directory files, environment

pub mod environment;
pub mod global_file;
pub mod workspace_file;
