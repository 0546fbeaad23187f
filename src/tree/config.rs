//! Hash tree build configuration.

use crate::access::AccessFlags;
use crate::hash::HashAlgorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// How much human-readable metadata a hash tree keeps next to its hashes.
///
/// Never influences hash values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verboseness {
    /// Package hashes only
    Terse,
    /// Package hashes and names, no class nodes
    Minimal,
    /// Package names and class nodes
    #[default]
    Normal,
    /// Additionally class names
    Debug,
    /// Additionally method nodes with their signatures
    Trace,
}

impl Verboseness {
    pub fn keeps_package_names(self) -> bool {
        self >= Verboseness::Minimal
    }

    pub fn keeps_class_nodes(self) -> bool {
        self >= Verboseness::Normal
    }

    pub fn keeps_class_names(self) -> bool {
        self >= Verboseness::Debug
    }

    pub fn keeps_method_nodes(self) -> bool {
        self >= Verboseness::Trace
    }
}

/// Parameters a hash tree was built with.
///
/// Two trees are comparable only if their configs are equal. Equality and
/// hashing ignore [`Verboseness`] since it does not change any hash.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeConfig {
    pub hash_algorithm: HashAlgorithm,
    /// Methods whose access flags intersect this mask are dropped
    pub access_filter: AccessFlags,
    /// Collapse sibling nodes with identical hashes
    pub filter_dups: bool,
    pub filter_inner_classes: bool,
    pub verboseness: Verboseness,
}

impl TreeConfig {
    pub fn new() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::default(),
            access_filter: AccessFlags::NONE,
            filter_dups: false,
            filter_inner_classes: false,
            verboseness: Verboseness::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    pub fn with_access_filter(mut self, filter: AccessFlags) -> Self {
        self.access_filter = filter;
        self
    }

    pub fn public_only(self) -> Self {
        self.with_access_filter(AccessFlags::public_only_filter())
    }

    pub fn with_filter_dups(mut self, filter_dups: bool) -> Self {
        self.filter_dups = filter_dups;
        self
    }

    pub fn with_filter_inner_classes(mut self, filter: bool) -> Self {
        self.filter_inner_classes = filter;
        self
    }

    pub fn with_verboseness(mut self, verboseness: Verboseness) -> Self {
        self.verboseness = verboseness;
        self
    }

    /// Configs every profile carries: default, public-only and deduplicated
    pub fn profile_set(verboseness: Verboseness) -> Vec<TreeConfig> {
        let base = TreeConfig::new().with_verboseness(verboseness);
        vec![base, base.public_only(), base.with_filter_dups(true)]
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TreeConfig {
    fn eq(&self, other: &Self) -> bool {
        self.hash_algorithm == other.hash_algorithm
            && self.access_filter == other.access_filter
            && self.filter_dups == other.filter_dups
            && self.filter_inner_classes == other.filter_inner_classes
    }
}

impl Eq for TreeConfig {}

impl Hash for TreeConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_algorithm.hash(state);
        self.access_filter.hash(state);
        self.filter_dups.hash(state);
        self.filter_inner_classes.hash(state);
    }
}

impl fmt::Display for TreeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, access filter: {}, filter dups: {}, filter inner classes: {}",
            self.hash_algorithm, self.access_filter, self.filter_dups, self.filter_inner_classes
        )
    }
}
