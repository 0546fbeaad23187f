//! CLI Tooling
//!
//! Command-line interface: profile libraries into the profile directory,
//! match applications against the catalog, and inspect stored profiles.

use crate::config::{ConfigLoader, LibSiftConfig};
use crate::error::ApiError;
use crate::hierarchy::ClassHierarchy;
use crate::identify::{identify_libraries, IdentificationReport};
use crate::logging::LoggingConfig;
use crate::profile::{AppProfile, LibProfile, LibraryDescription};
use crate::store::{FsProfileStore, LibraryCatalog, ProfileStore};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// libsift - obfuscation-tolerant third-party library detection
#[derive(Debug, Parser)]
#[command(name = "libsift")]
#[command(about = "Detect third-party libraries in applications using Merkle hash tree profiles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding library profiles
    #[arg(long, global = true)]
    pub profiles_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// `base` with the logging flags applied
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(ref level) = self.log_level {
            config.level = level.clone();
        }
        if let Some(ref format) = self.log_format {
            config.format = format.clone();
        }
        if let Some(ref output) = self.log_output {
            config.output = output.clone();
        }
        if let Some(ref file) = self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a library profile and store it in the profile directory
    Profile {
        /// Class dump of the library (JSON)
        #[arg(long)]
        classes: PathBuf,
        /// Library description (TOML)
        #[arg(long)]
        description: PathBuf,
        /// Keep method signatures in the profile
        #[arg(long)]
        verbose_profile: bool,
    },
    /// Match an application against all library profiles
    Match {
        /// Class dump of the application (JSON)
        #[arg(long)]
        classes: PathBuf,
        /// Package of the application itself, never reported as library code
        #[arg(long)]
        app_package: Option<String>,
        /// Also write the results as JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,
        /// Only report full matches
        #[arg(long)]
        no_partial_matching: bool,
        /// Stop matching further libraries after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show the contents of a stored profile
    Inspect {
        /// Profile file (.libv)
        profile: PathBuf,
        /// Also print the package tree
        #[arg(long)]
        packages: bool,
    },
}

/// Resolved configuration and profile store of one CLI invocation
pub struct CliContext {
    config: LibSiftConfig,
    store: FsProfileStore,
}

impl CliContext {
    /// Load configuration and apply the global flags of `cli`
    pub fn new(cli: &Cli) -> Result<Self, ApiError> {
        let mut config = ConfigLoader::load(cli.config.as_deref())?;
        if let Some(ref dir) = cli.profiles_dir {
            config.profiles_dir = dir.clone();
        }
        config.logging = cli.logging_config(&config.logging);
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: LibSiftConfig) -> Self {
        let store = FsProfileStore::new(config.profiles_dir.clone());
        Self { config, store }
    }

    pub fn config(&self) -> &LibSiftConfig {
        &self.config
    }

    /// Execute a CLI command, returning the text to print
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = match command {
            Commands::Profile {
                classes,
                description,
                verbose_profile,
            } => self.handle_profile(classes, description, *verbose_profile),
            Commands::Match {
                classes,
                app_package,
                json,
                no_partial_matching,
                timeout,
            } => self.handle_match(
                classes,
                app_package.clone(),
                json.as_deref(),
                *no_partial_matching,
                *timeout,
            ),
            Commands::Inspect { profile, packages } => self.handle_inspect(profile, *packages),
        };
        info!(
            "Command {} finished in {} ms (ok: {})",
            command_name(command),
            started.elapsed().as_millis(),
            result.is_ok()
        );
        result
    }

    fn load_hierarchy(&self, path: &Path) -> Result<ClassHierarchy, ApiError> {
        Ok(ClassHierarchy::from_json_file(path)?
            .with_framework_packages(self.config.hierarchy.framework_packages.clone()))
    }

    fn handle_profile(
        &self,
        classes: &Path,
        description: &Path,
        verbose_profile: bool,
    ) -> Result<String, ApiError> {
        let hierarchy = self.load_hierarchy(classes)?;
        let description = LibraryDescription::from_toml_file(description)?;
        let verboseness = if verbose_profile {
            crate::tree::Verboseness::Trace
        } else {
            self.config.profiling.verboseness()
        };

        let profile = LibProfile::create(&hierarchy, description, verboseness)?;
        let path = self.store.save(&profile)?;
        Ok(format!(
            "Profile of {} saved to {}",
            profile.description,
            path.display()
        ))
    }

    fn handle_match(
        &self,
        classes: &Path,
        app_package: Option<String>,
        json: Option<&Path>,
        no_partial_matching: bool,
        timeout: Option<u64>,
    ) -> Result<String, ApiError> {
        let hierarchy = self.load_hierarchy(classes)?;
        let mut app = AppProfile::create(&hierarchy, self.config.profiling.verboseness());
        if app_package.is_some() {
            app = app.with_package_name(app_package);
        }

        let load = LibraryCatalog::load(&self.store)?;
        for skipped in &load.skipped {
            warn!("Skipped {}: {}", skipped.path.display(), skipped.reason);
        }
        if load.catalog.is_empty() {
            return Ok(format!(
                "No library profiles found in {}",
                self.store.root().display()
            ));
        }

        let mut options = self.config.matching.identify_options(app.package_name.clone());
        options.matching.no_partial_matching |= no_partial_matching;
        if let Some(secs) = timeout {
            options.deadline = Some(Duration::from_secs(secs));
        }

        let report = run_blocking(identify_libraries(Arc::new(app), &load.catalog, &options))??;
        if let Some(path) = json {
            write_json_report(&report, path)?;
        }

        let mut out = report.render_text();
        if !load.skipped.is_empty() {
            out.push_str(&format!(
                "  {} unreadable profiles skipped\n",
                load.skipped.len()
            ));
        }
        Ok(out)
    }

    fn handle_inspect(&self, path: &Path, packages: bool) -> Result<String, ApiError> {
        let profile = self.store.load(path)?;
        Ok(format_profile_text(&profile, packages))
    }
}

/// Drive a future to completion on a fresh runtime
fn run_blocking<F: std::future::Future>(future: F) -> Result<F::Output, ApiError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ApiError::TaskFailed(
            "Cannot start matching from within an async runtime".to_string(),
        ));
    }
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| ApiError::TaskFailed(format!("Failed to create runtime: {}", e)))?;
    Ok(rt.block_on(future))
}

fn write_json_report(report: &IdentificationReport, path: &Path) -> Result<(), ApiError> {
    let json = serde_json::to_string_pretty(&report.to_json())
        .map_err(|e| crate::error::StorageError::Serialization(e.to_string()))?;
    std::fs::write(path, json).map_err(crate::error::StorageError::IoError)?;
    info!("Wrote JSON report to {}", path.display());
    Ok(())
}

/// Human-readable summary of a stored profile
pub fn format_profile_text(profile: &LibProfile, packages: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", "Library profile".bold().underline()));
    for line in profile.description.describe() {
        out.push_str(&format!("  {}\n", line));
    }
    out.push_str(&format!(
        "  Root package: {}\n",
        profile.root_package().unwrap_or_else(|| "-".to_string())
    ));
    out.push_str(&format!(
        "  Packages: {} ({} classes)\n\n",
        profile.package_tree.number_of_non_empty_packages(),
        profile.package_tree.number_of_app_classes()
    ));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Config", "Root hash", "Packages", "Classes", "Methods"]);
    for tree in &profile.hash_trees {
        table.add_row(vec![
            tree.config().to_string(),
            tree.root_hash().short(),
            tree.number_of_packages().to_string(),
            tree.number_of_classes().to_string(),
            tree.number_of_methods().to_string(),
        ]);
    }
    out.push_str(&format!("{}\n", table));

    if packages {
        out.push_str(&format!("\n{}\n\n", "Package tree".bold().underline()));
        out.push_str(&profile.package_tree.render(true));
    }
    out
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Profile { .. } => "profile",
        Commands::Match { .. } => "match",
        Commands::Inspect { .. } => "inspect",
    }
}
