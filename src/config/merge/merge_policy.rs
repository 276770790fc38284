//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("target.protocol", "ftp")?
        .set_default("target.port", 21)?
        .set_default("target.user", "anonymous")?
        .set_default("target.connect_timeout_secs", 30)?
        .set_default("sync.include_hidden", false)?
        .set_default("sync.skip_empty_directories", false)?
        .set_default("sync.time_comparison", "differs")?
        .set_default("sync.modify_window_secs", 2)?
        .set_default("sync.confirm_deletions", true)
}
