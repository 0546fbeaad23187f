//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::LibSiftConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from files and environment.
    pub fn load(explicit: Option<&Path>) -> Result<LibSiftConfig, ConfigError> {
        MergeService::load(explicit)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<LibSiftConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> LibSiftConfig {
        LibSiftConfig::default()
    }
}
