//! Environment variable source: `LIBSIFT__` prefix with `__` separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const ENV_PREFIX: &str = "LIBSIFT";

/// Add the environment overlay, e.g. `LIBSIFT__MATCHING__NO_PARTIAL_MATCHING=true`.
///
/// List values are comma separated.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("matching.ambiguous_root_packages")
            .with_list_parse_key("hierarchy.framework_packages")
            .try_parsing(true),
    );
    Ok(builder)
}
