//! Matching engine
//!
//! Compares an application hash tree with a library hash tree built under
//! the same [`TreeConfig`](crate::tree::TreeConfig):
//!
//! 0. Full match if every library package hash occurs in the app.
//! 1. Otherwise build a candidate list of similar app packages for each
//!    library package.
//! 2. Enumerate partitions, app package prefixes that could be the library's
//!    root package after renaming.
//! 3. Per partition, restrict the candidates and align them.
//! 4. Report the best partition as partial match.

pub mod aligner;
pub mod candidates;
pub mod partition;
pub mod similarity;

pub use aligner::{best_alignment, combination_count, AlignOutcome};
pub use candidates::{candidate_lists, package_relationships, Candidate, CandidateList};
pub use partition::{partitions, restrict_to_partition};
pub use similarity::node_sim_score;

use crate::error::ApiError;
use crate::profile::{
    AppProfile, HTreeMatch, LibProfile, ProfileMatch, SimScore, MATCH_HTREE_FULL,
};
use crate::tree::{HashTree, Node};
use crate::types::Score;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Partial matches must score strictly above this
pub const MIN_PARTIAL_MATCHING_SCORE: Score = 0.7;
/// App packages must score strictly above this to become candidates
pub const MIN_CLAZZ_SCORE: Score = 0.33;
/// Share of library packages that need a candidate inside a partition
pub const MIN_CANDIDATE_COVERAGE: f32 = 0.5;
/// Ceiling for the aligner's exhaustive enumeration
pub const MAX_COMBINATIONS: u64 = 65_536;

/// Knobs of a matching run
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    /// The app's own package; app packages under it are never candidates
    pub app_package: Option<String>,
    /// Stop after the full-match check
    pub no_partial_matching: bool,
}

/// Matches app hash trees against library hash trees
#[derive(Debug, Clone, Default)]
pub struct LibraryMatcher {
    options: MatchOptions,
}

impl LibraryMatcher {
    pub fn new(options: MatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Match every app hash tree against the library tree of the same config.
    ///
    /// Configs the library was not profiled with are skipped with a warning.
    pub fn match_profile(&self, app: &AppProfile, lib: Arc<LibProfile>) -> ProfileMatch {
        let lib_root = lib.root_package();
        let mut result = ProfileMatch::new(Arc::clone(&lib));

        for app_tree in &app.hash_trees {
            let Some(lib_tree) = lib.tree_by_config(app_tree.config()) else {
                warn!(
                    "No hash tree for config ({}) in profile {}, skipped",
                    app_tree.config(),
                    lib.description
                );
                continue;
            };
            match self.match_trees(app_tree, lib_tree, lib_root.as_deref()) {
                Ok(m) => result.add_result(m),
                Err(e) => warn!("Failed to match {}: {}", lib.description, e),
            }
        }
        result
    }

    /// Compare one app tree with one library tree.
    ///
    /// `lib_root_package` is the library's inferred root package; without
    /// one only full matches are detected. Trees built with different
    /// configs are refused.
    pub fn match_trees(
        &self,
        app_tree: &HashTree,
        lib_tree: &HashTree,
        lib_root_package: Option<&str>,
    ) -> Result<HTreeMatch, ApiError> {
        let config = *app_tree.config();
        if lib_tree.config() != app_tree.config() {
            return Err(ApiError::ConfigMismatch {
                app: config,
                lib: *lib_tree.config(),
            });
        }
        if lib_tree.is_empty() {
            return Err(ApiError::EmptyHashTree(format!(
                "library tree ({})",
                lib_tree.config()
            )));
        }
        debug!("Matching config: {}", config);

        // step 0: full match
        let lib_hashes = lib_tree.package_hashes();
        let app_hashes = app_tree.package_hashes();
        if lib_hashes.is_subset(&app_hashes) {
            debug!(
                "All {} package hashes of the library match",
                lib_hashes.len()
            );
            let matched: Vec<Node> = app_tree
                .package_nodes()
                .iter()
                .filter(|n| lib_hashes.contains(n.hash()))
                .cloned()
                .collect();
            return Ok(HTreeMatch::new(config, SimScore::Full).with_matched_nodes(matched));
        }

        if self.options.no_partial_matching {
            debug!("Partial matching disabled, skipped");
            return Ok(HTreeMatch::new(config, SimScore::NoMatch));
        }

        // step 0.5: a root package is required for partitioning
        let Some(lib_root) = lib_root_package else {
            debug!("No unique library root package, partial matching skipped");
            return Ok(HTreeMatch::new(config, SimScore::NoRootPackage));
        };

        Ok(self.partial_match(app_tree, lib_tree, lib_root))
    }

    fn partial_match(&self, app_tree: &HashTree, lib_tree: &HashTree, lib_root: &str) -> HTreeMatch {
        let config = *app_tree.config();

        // step 1: candidate lists
        let lists = candidate_lists(
            lib_tree.package_nodes(),
            app_tree.package_nodes(),
            self.options.app_package.as_deref(),
        );
        for list in &lists {
            trace!("  {}", list);
        }
        let relationships = package_relationships(&lists);

        // step 2: partitions
        let parts = partitions(app_tree.package_nodes(), lib_root);
        debug!("Partitions ({}): {:?}", parts.len(), parts);

        // step 3: best alignment per partition
        let mut best: Option<(&str, Score, Vec<Candidate<'_>>)> = None;
        for partition in &parts {
            let Some(restricted) = restrict_to_partition(&lists, partition) else {
                continue;
            };
            match best_alignment(&restricted, &relationships) {
                AlignOutcome::Best { score, selection } => {
                    debug!("Partition {} scores {}", partition, score);
                    // step 4: strictly greater, the first partition wins ties
                    if best.as_ref().map_or(true, |(_, s, _)| score > *s) {
                        best = Some((partition.as_str(), score, selection));
                    }
                }
                AlignOutcome::NoImprovement => {
                    trace!("Partition {}: no alignment above threshold", partition);
                }
                AlignOutcome::TooManyCombinations { combinations } => {
                    debug!(
                        "Partition {}: {} combinations exceed the limit, skipped",
                        partition, combinations
                    );
                }
            }
        }

        match best {
            Some((partition, score, selection)) => {
                debug!("Best partial match: {} (partition {})", score, partition);
                let matched: Vec<Node> = selection.iter().map(|c| c.node.clone()).collect();
                // every library package contained in an app package counts as full
                let sim = if score >= MATCH_HTREE_FULL {
                    SimScore::Full
                } else {
                    SimScore::Partial(score)
                };
                HTreeMatch::new(config, sim)
                    .with_matched_nodes(matched)
                    .with_root_package(Some(partition.to_string()))
            }
            None => {
                debug!("No partial match");
                HTreeMatch::new(config, SimScore::NoMatch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessFlags;
    use crate::hierarchy::{ClassHierarchy, ClassInfo, MethodInfo};
    use crate::tree::TreeConfig;

    fn class(name: &str, methods: &[&str]) -> ClassInfo {
        methods.iter().fold(ClassInfo::new(name), |c, m| {
            c.with_method(MethodInfo::new(*m, AccessFlags::PUBLIC).with_params([*m]))
        })
    }

    fn tree(classes: Vec<ClassInfo>) -> HashTree {
        HashTree::build(&ClassHierarchy::new(classes), TreeConfig::new())
    }

    #[test]
    fn test_self_match_is_full() {
        let t = tree(vec![class("com.foo.a.A", &["I"]), class("com.foo.b.B", &["J"])]);
        let m = LibraryMatcher::default().match_trees(&t, &t, Some("com.foo")).unwrap();
        assert_eq!(m.score, SimScore::Full);
        assert_eq!(m.matched_nodes.len(), 2);
    }

    #[test]
    fn test_config_mismatch() {
        let h = ClassHierarchy::new(vec![class("com.foo.A", &["I"])]);
        let a = HashTree::build(&h, TreeConfig::new());
        let b = HashTree::build(&h, TreeConfig::new().public_only());
        let err = LibraryMatcher::default().match_trees(&a, &b, None).unwrap_err();
        assert!(matches!(err, ApiError::ConfigMismatch { .. }));
    }

    #[test]
    fn test_no_root_package_gate() {
        let lib = tree(vec![class("com.foo.A", &["I"])]);
        let app = tree(vec![class("org.bar.B", &["J"])]);
        let m = LibraryMatcher::default().match_trees(&app, &lib, None).unwrap();
        assert_eq!(m.score, SimScore::NoRootPackage);
        assert_eq!(m.score.value(), -1.0);
    }

    #[test]
    fn test_partial_matching_disabled() {
        let lib = tree(vec![class("com.foo.A", &["I"])]);
        let app = tree(vec![class("org.bar.B", &["J"])]);
        let matcher = LibraryMatcher::new(MatchOptions {
            no_partial_matching: true,
            ..Default::default()
        });
        let m = matcher.match_trees(&app, &lib, Some("com.foo")).unwrap();
        assert_eq!(m.score, SimScore::NoMatch);
    }

    #[test]
    fn test_partial_match_under_renamed_root() {
        // library: two packages with four classes each
        let lib = tree(vec![
            class("com.lib.a.A1", &["I"]),
            class("com.lib.a.A2", &["J"]),
            class("com.lib.a.A3", &["Z"]),
            class("com.lib.a.A4", &["B"]),
            class("com.lib.b.B1", &["C"]),
            class("com.lib.b.B2", &["S"]),
            class("com.lib.b.B3", &["F"]),
            class("com.lib.b.B4", &["D"]),
        ]);
        // app: renamed root, one class of each package missing
        let app = tree(vec![
            class("x.y.a.A1", &["I"]),
            class("x.y.a.A2", &["J"]),
            class("x.y.a.A3", &["Z"]),
            class("x.y.b.B1", &["C"]),
            class("x.y.b.B2", &["S"]),
            class("x.y.b.B3", &["F"]),
            class("x.y.b.Extra", &["I", "J"]),
        ]);
        let m = LibraryMatcher::default()
            .match_trees(&app, &lib, Some("com.lib"))
            .unwrap();
        match m.score {
            SimScore::Partial(score) => assert!((score - 0.75).abs() < 1e-6),
            other => panic!("expected partial match, got {:?}", other),
        }
        assert_eq!(m.root_package.as_deref(), Some("x.y"));
        let mut names = m.matched_package_names();
        names.sort();
        assert_eq!(names, vec!["x.y.a", "x.y.b"]);
    }
}
