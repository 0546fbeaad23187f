//! Configuration
//!
//! [`LibSiftConfig`] is assembled from layered sources with the `config`
//! crate: built-in defaults, the global config file, an explicit file and
//! `LIBSIFT__*` environment variables.

pub mod facade;
pub mod merge {
    pub mod policy;
    pub mod service;
}
pub mod paths {
    pub mod xdg_root;
}
pub mod sources {
    pub mod environment;
    pub mod global_file;
}

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::hierarchy::DEFAULT_FRAMEWORK_PACKAGES;
use crate::identify::{IdentifyOptions, DEFAULT_AMBIGUOUS_ROOT_PACKAGES};
use crate::logging::LoggingConfig;
use crate::matching::MatchOptions;
use crate::tree::Verboseness;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Only report full matches
    #[serde(default)]
    pub no_partial_matching: bool,

    /// Library root packages ignored by the root package presence scan
    #[serde(default = "default_ambiguous_root_packages")]
    pub ambiguous_root_packages: Vec<String>,

    /// Stop matching new libraries after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_ambiguous_root_packages() -> Vec<String> {
    DEFAULT_AMBIGUOUS_ROOT_PACKAGES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            no_partial_matching: false,
            ambiguous_root_packages: default_ambiguous_root_packages(),
            timeout_secs: None,
        }
    }
}

impl MatchingConfig {
    /// Identification options for an app declaring `app_package`
    pub fn identify_options(&self, app_package: Option<String>) -> IdentifyOptions {
        IdentifyOptions {
            matching: MatchOptions {
                app_package,
                no_partial_matching: self.no_partial_matching,
            },
            ambiguous_root_packages: self.ambiguous_root_packages.clone(),
            deadline: self.timeout_secs.map(std::time::Duration::from_secs),
        }
    }
}

/// Profile generation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilingConfig {
    /// Keep method nodes and signatures in generated profiles
    #[serde(default)]
    pub verbose_profiles: bool,
}

impl ProfilingConfig {
    pub fn verboseness(&self) -> Verboseness {
        if self.verbose_profiles {
            Verboseness::Trace
        } else {
            Verboseness::Normal
        }
    }
}

/// Class hierarchy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Package prefixes whose unresolved types count as external
    #[serde(default = "default_framework_packages")]
    pub framework_packages: Vec<String>,
}

fn default_framework_packages() -> Vec<String> {
    DEFAULT_FRAMEWORK_PACKAGES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            framework_packages: default_framework_packages(),
        }
    }
}

fn default_profiles_dir() -> PathBuf {
    xdg::default_profiles_dir()
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibSiftConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory holding the library profiles
    #[serde(default = "default_profiles_dir")]
    pub profiles_dir: PathBuf,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub profiling: ProfilingConfig,

    #[serde(default)]
    pub hierarchy: HierarchyConfig,
}

impl Default for LibSiftConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            profiles_dir: default_profiles_dir(),
            matching: MatchingConfig::default(),
            profiling: ProfilingConfig::default(),
            hierarchy: HierarchyConfig::default(),
        }
    }
}
