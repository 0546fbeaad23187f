//! Deterministic hash tree construction from a class hierarchy.

use super::config::TreeConfig;
use super::hasher::{canonicalize, combine_nodes};
use super::node::Node;
use super::{HashTree, TreeStats};
use crate::descriptor::fuzzy_descriptor;
use crate::hierarchy::{ClassHierarchy, ClassInfo};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Builds [`HashTree`]s for one hierarchy
pub struct TreeBuilder<'a> {
    hierarchy: &'a ClassHierarchy,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(hierarchy: &'a ClassHierarchy) -> Self {
        Self { hierarchy }
    }

    /// Build a tree over every fingerprintable class of the hierarchy
    pub fn build(&self, config: TreeConfig) -> HashTree {
        self.build_from(self.hierarchy.app_classes(), config)
    }

    /// Build a tree over `classes`; classes outside the analyzed unit are skipped
    pub fn build_from<'c, I>(&self, classes: I, config: TreeConfig) -> HashTree
    where
        I: IntoIterator<Item = &'c ClassInfo>,
    {
        let algorithm = config.hash_algorithm;
        let verboseness = config.verboseness;
        let mut stats = TreeStats::default();

        // BTreeMap: packages are hashed in name order
        let mut packages: BTreeMap<&str, Vec<Node>> = BTreeMap::new();

        for class in classes {
            if !class.is_fingerprintable() {
                continue;
            }
            if config.filter_inner_classes && class.is_inner_class() {
                continue;
            }

            let mut methods: Vec<Node> = class
                .methods
                .iter()
                .filter(|m| !m.is_bridge_or_synthetic && m.access.passes(config.access_filter))
                .map(|m| {
                    let desc = fuzzy_descriptor(m, class, self.hierarchy);
                    let signature = verboseness.keeps_method_nodes().then(|| m.signature(class));
                    Node::method(algorithm.digest(desc.as_bytes()), signature)
                })
                .collect();

            if methods.is_empty() {
                trace!("Class {} has no methods after filtering, skipped", class.name);
                continue;
            }

            canonicalize(&mut methods, config.filter_dups);
            stats.methods += methods.len();
            stats.classes += 1;

            let hash = combine_nodes(algorithm, &methods);
            let name = verboseness.keeps_class_names().then(|| class.name.clone());
            let children = if verboseness.keeps_method_nodes() {
                methods
            } else {
                Vec::new()
            };
            packages
                .entry(class.package_name())
                .or_default()
                .push(Node::class(hash, name, children));
        }

        let mut package_nodes = Vec::with_capacity(packages.len());
        for (package, mut classes) in packages {
            canonicalize(&mut classes, config.filter_dups);
            let hash = combine_nodes(algorithm, &classes);
            let name = verboseness.keeps_package_names().then(|| package.to_string());
            let children = if verboseness.keeps_class_nodes() {
                classes
            } else {
                Vec::new()
            };
            package_nodes.push(Node::package(hash, name, children));
        }
        canonicalize(&mut package_nodes, config.filter_dups);
        stats.packages = package_nodes.len();

        let root = Node::root(combine_nodes(algorithm, &package_nodes), package_nodes);
        debug!(
            packages = stats.packages,
            classes = stats.classes,
            methods = stats.methods,
            root = %root.hash().short(),
            "Hash tree built ({})",
            config
        );

        HashTree::from_parts(config, root, stats)
    }
}
