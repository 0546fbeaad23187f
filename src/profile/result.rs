//! Match results between an application and one library

use super::description::{LibraryCategory, SecurityAdvisory};
use super::library::LibProfile;
use crate::pkg::PackageTree;
use crate::tree::{Node, TreeConfig};
use crate::types::Score;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Score of a full match
pub const MATCH_HTREE_FULL: Score = 1.0;
/// Score of a comparison without any match
pub const MATCH_HTREE_NONE: Score = 0.0;
/// Score when partial matching was skipped for lack of a library root package
pub const MATCH_HTREE_NO_ROOT_PCKG: Score = -1.0;

/// Outcome of comparing one app hash tree with one library hash tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "score", rename_all = "snake_case")]
pub enum SimScore {
    /// The library has no unique root package, partial matching was not attempted
    NoRootPackage,
    NoMatch,
    /// Partial match above the partial threshold, strictly below 1.0
    Partial(Score),
    /// Every library package hash is present in the app
    Full,
}

impl SimScore {
    pub fn value(self) -> Score {
        match self {
            SimScore::NoRootPackage => MATCH_HTREE_NO_ROOT_PCKG,
            SimScore::NoMatch => MATCH_HTREE_NONE,
            SimScore::Partial(score) => score,
            SimScore::Full => MATCH_HTREE_FULL,
        }
    }

    pub fn is_full(self) -> bool {
        matches!(self, SimScore::Full)
    }

    pub fn is_partial(self) -> bool {
        matches!(self, SimScore::Partial(_))
    }
}

impl fmt::Display for SimScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimScore::NoRootPackage => write!(f, "no root package"),
            SimScore::NoMatch => write!(f, "no match"),
            SimScore::Partial(score) => write!(f, "partial match ({:.4})", score),
            SimScore::Full => write!(f, "full match"),
        }
    }
}

/// Result for one [`TreeConfig`]
#[derive(Debug, Clone)]
pub struct HTreeMatch {
    pub config: TreeConfig,
    pub score: SimScore,
    /// App package nodes that matched
    pub matched_nodes: Vec<Node>,
    /// Inferred app root package of a partial match
    pub root_package: Option<String>,
}

impl HTreeMatch {
    pub fn new(config: TreeConfig, score: SimScore) -> Self {
        Self {
            config,
            score,
            matched_nodes: Vec::new(),
            root_package: None,
        }
    }

    pub fn with_matched_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.matched_nodes = nodes;
        self
    }

    pub fn with_root_package(mut self, root_package: Option<String>) -> Self {
        self.root_package = root_package;
        self
    }

    pub fn is_full_match(&self) -> bool {
        self.score.is_full()
    }

    pub fn is_partial_match(&self) -> bool {
        self.score.is_partial()
    }

    /// Names of the matched app packages (empty for nameless trees)
    pub fn matched_package_names(&self) -> Vec<String> {
        self.matched_nodes
            .iter()
            .filter_map(Node::package_name)
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Display for HTreeMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config: {} - {}", self.config, self.score)?;
        if let (true, Some(root)) = (self.is_partial_match(), &self.root_package) {
            write!(f, ", root package: {}", root)?;
        }
        Ok(())
    }
}

/// Coarse classification of a [`ProfileMatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLevel {
    /// Every config matched fully
    AllConfigs,
    /// At least one config matched fully
    SomeConfigs,
    /// No full match, at least one partial match
    Partial,
    None,
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchLevel::AllConfigs => "all configs",
            MatchLevel::SomeConfigs => "some configs",
            MatchLevel::Partial => "partial",
            MatchLevel::None => "none",
        };
        f.write_str(s)
    }
}

/// Per-library accumulator of [`HTreeMatch`]es, kept sorted by score.
///
/// Created at the start of matching one library, filled config by config,
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct ProfileMatch {
    lib: Arc<LibProfile>,
    results: Vec<HTreeMatch>,
    /// The library root package was found verbatim in the app
    pub lib_root_package_present: bool,
    /// A newer version of the library exists in the catalog
    pub is_deprecated: bool,
    /// The run deadline passed before this library was matched
    pub timed_out: bool,
}

impl ProfileMatch {
    pub fn new(lib: Arc<LibProfile>) -> Self {
        Self {
            lib,
            results: Vec::new(),
            lib_root_package_present: false,
            is_deprecated: false,
            timed_out: false,
        }
    }

    pub fn lib(&self) -> &LibProfile {
        &self.lib
    }

    /// Insert a result, keeping results sorted by descending score
    pub fn add_result(&mut self, result: HTreeMatch) {
        self.results.push(result);
        self.results.sort_by(|a, b| {
            b.score
                .value()
                .total_cmp(&a.score.value())
                .then_with(|| b.is_full_match().cmp(&a.is_full_match()))
        });
    }

    pub fn results(&self) -> &[HTreeMatch] {
        &self.results
    }

    pub fn result_by_config(&self, config: &TreeConfig) -> Option<&HTreeMatch> {
        self.results.iter().find(|r| &r.config == config)
    }

    pub fn best_results(&self, n: usize) -> &[HTreeMatch] {
        &self.results[..n.min(self.results.len())]
    }

    pub fn highest_score(&self) -> Option<&HTreeMatch> {
        self.results.first()
    }

    /// Every evaluated config matched fully; false if nothing was evaluated
    pub fn all_configs_match(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(HTreeMatch::is_full_match)
    }

    /// At least one config matched fully
    pub fn is_match(&self) -> bool {
        self.results.iter().any(HTreeMatch::is_full_match)
    }

    /// No full match, but at least one partial one
    pub fn is_partial_match(&self) -> bool {
        !self.is_match() && self.results.iter().any(HTreeMatch::is_partial_match)
    }

    pub fn matched_configs(&self) -> Vec<TreeConfig> {
        self.results
            .iter()
            .filter(|r| r.is_full_match())
            .map(|r| r.config)
            .collect()
    }

    pub fn partially_matched_configs(&self) -> Vec<TreeConfig> {
        self.results
            .iter()
            .filter(|r| r.is_partial_match())
            .map(|r| r.config)
            .collect()
    }

    /// Whether `config` produced a full match
    pub fn matches_config(&self, config: &TreeConfig) -> bool {
        self.result_by_config(config)
            .is_some_and(HTreeMatch::is_full_match)
    }

    pub fn classification(&self) -> MatchLevel {
        if self.all_configs_match() {
            MatchLevel::AllConfigs
        } else if self.is_match() {
            MatchLevel::SomeConfigs
        } else if self.is_partial_match() {
            MatchLevel::Partial
        } else {
            MatchLevel::None
        }
    }

    /// Package tree spanned by the app packages of the first full match
    pub fn matched_package_tree(&self) -> Option<PackageTree> {
        let full = self.results.iter().find(|r| r.is_full_match())?;
        Some(PackageTree::from_packages(full.matched_package_names()))
    }

    /// Whether the library was matched fully under different package names.
    ///
    /// Compares the package names of the library tree with those of the
    /// matched app nodes for the first full match. When the app holds extra
    /// copies of a library package the name lists differ in length, and the
    /// library counts as obfuscated once any of its names is missing among
    /// the matched ones. False for partial or no matches and for trees that
    /// carry no package names.
    pub fn is_lib_obfuscated(&self) -> bool {
        let Some(full) = self.results.iter().find(|r| r.is_full_match()) else {
            return false;
        };
        let Some(lib_tree) = self.lib.tree_by_config(&full.config) else {
            return false;
        };

        let mut lib_names = lib_tree.package_names();
        let mut app_names: Vec<&str> = full
            .matched_nodes
            .iter()
            .filter_map(Node::package_name)
            .collect();
        lib_names.sort_unstable();
        app_names.sort_unstable();

        if lib_names.len() != app_names.len() {
            return lib_names
                .iter()
                .any(|lib| app_names.binary_search(lib).is_err());
        }
        lib_names
            .iter()
            .zip(app_names.iter())
            .any(|(lib, app)| lib != app)
    }

    pub fn summary(&self) -> MatchSummary {
        let description = &self.lib.description;
        MatchSummary {
            name: description.name.clone(),
            version: description.version.clone(),
            category: description.category,
            classification: self.classification(),
            deprecated: self.is_deprecated,
            obfuscated: self.is_lib_obfuscated(),
            lib_root_package_present: self.lib_root_package_present,
            security: description.security_advisory(),
            timed_out: self.timed_out,
            results: self
                .results
                .iter()
                .map(|r| ConfigResult {
                    config: r.config.to_string(),
                    score: r.score,
                    root_package: r.root_package.clone(),
                    matched_packages: r.matched_package_names(),
                })
                .collect(),
        }
    }
}

/// Serializable view of a [`ProfileMatch`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub name: String,
    pub version: Option<String>,
    pub category: LibraryCategory,
    pub classification: MatchLevel,
    pub deprecated: bool,
    pub obfuscated: bool,
    pub lib_root_package_present: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub security: Option<SecurityAdvisory>,
    #[serde(default)]
    pub timed_out: bool,
    pub results: Vec<ConfigResult>,
}

/// Serializable view of an [`HTreeMatch`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigResult {
    pub config: String,
    pub score: SimScore,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub root_package: Option<String>,
    #[serde(default)]
    pub matched_packages: Vec<String>,
}
