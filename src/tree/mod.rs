//! Hash trees
//!
//! A hash tree is a Merkle tree over a class hierarchy with the levels
//! root, package, class and (optionally retained) method. Method hashes are
//! digests of fuzzy descriptors; every inner hash is the digest of the
//! concatenated, canonically sorted child hashes. Building the same classes
//! with the same [`TreeConfig`] always yields bit-identical hashes,
//! independent of input order.

pub mod builder;
pub mod config;
pub mod hasher;
pub mod node;

pub use builder::TreeBuilder;
pub use config::{TreeConfig, Verboseness};
pub use node::{Node, NodeKind, NodeLevel};

use crate::hierarchy::ClassHierarchy;
use crate::pkg::{is_sub_package, PackageTree};
use crate::types::NodeHash;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Element counts recorded while building; independent of verboseness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub packages: usize,
    pub classes: usize,
    pub methods: usize,
}

/// A hash tree together with the config it was built with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashTree {
    config: TreeConfig,
    root: Node,
    stats: TreeStats,
}

impl HashTree {
    /// Build a tree over the fingerprintable classes of `hierarchy`
    pub fn build(hierarchy: &ClassHierarchy, config: TreeConfig) -> Self {
        TreeBuilder::new(hierarchy).build(config)
    }

    pub(crate) fn from_parts(config: TreeConfig, root: Node, stats: TreeStats) -> Self {
        Self {
            config,
            root,
            stats,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_hash(&self) -> &NodeHash {
        self.root.hash()
    }

    pub fn stats(&self) -> TreeStats {
        self.stats
    }

    /// No class survived filtering. Empty trees must not be persisted or matched.
    pub fn is_empty(&self) -> bool {
        self.root.is_leaf()
    }

    pub fn package_nodes(&self) -> &[Node] {
        self.root.children()
    }

    pub fn number_of_packages(&self) -> usize {
        self.stats.packages
    }

    pub fn number_of_classes(&self) -> usize {
        self.stats.classes
    }

    pub fn number_of_methods(&self) -> usize {
        self.stats.methods
    }

    /// Hashes of all package nodes
    pub fn package_hashes(&self) -> HashSet<&NodeHash> {
        self.package_nodes().iter().map(Node::hash).collect()
    }

    /// Names of all package nodes, in tree order (requires package names)
    pub fn package_names(&self) -> Vec<&str> {
        self.package_nodes()
            .iter()
            .filter_map(Node::package_name)
            .collect()
    }

    /// Method signatures, only available for trees built with [`Verboseness::Trace`]
    pub fn method_signatures(&self) -> Vec<&str> {
        let mut result = Vec::new();
        for package in self.package_nodes() {
            for class in package.children() {
                result.extend(class.children().iter().filter_map(Node::label));
            }
        }
        result
    }

    /// Package tree spanned by the named package nodes
    pub fn package_tree(&self) -> PackageTree {
        PackageTree::from_packages(self.package_names())
    }

    /// Tree restricted to the packages at or below `prefix`, with a new root
    /// hash over them. `None` if no named package lies under `prefix`.
    pub fn subtree_for_package(&self, prefix: &str) -> Option<HashTree> {
        let packages: Vec<Node> = self
            .package_nodes()
            .iter()
            .filter(|n| n.package_name().is_some_and(|p| is_sub_package(p, prefix)))
            .cloned()
            .collect();
        if packages.is_empty() {
            return None;
        }

        let stats = TreeStats {
            packages: packages.len(),
            classes: packages.iter().map(Node::num_children).sum(),
            methods: 0,
        };
        let hash = hasher::combine_nodes(self.config.hash_algorithm, &packages);
        Some(HashTree::from_parts(
            self.config,
            Node::root(hash, packages),
            stats,
        ))
    }
}

/// Tree in `trees` built with a config equal to `config`
pub fn tree_by_config<'a>(trees: &'a [HashTree], config: &TreeConfig) -> Option<&'a HashTree> {
    trees.iter().find(|t| t.config() == config)
}
