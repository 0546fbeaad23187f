//! Merge policy: built-in defaults form the lowest layer

use crate::config::LibSiftConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with [`LibSiftConfig::default`]
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&LibSiftConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
