//! Environment source: FSYNC_<SECTION>__<KEY>, e.g. FSYNC_TARGET__HOST

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Add environment overrides to builder.
///
/// `FSYNC_SYNC__EXCLUDE` takes a comma-separated list.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("FSYNC")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("sync.exclude"),
    )
}
