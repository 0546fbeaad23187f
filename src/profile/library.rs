//! Library and application profiles

use super::description::LibraryDescription;
use crate::error::ApiError;
use crate::hierarchy::ClassHierarchy;
use crate::pkg::PackageTree;
use crate::tree::{tree_by_config, HashTree, TreeConfig, Verboseness};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Package tree plus one hash tree per [`TreeConfig`] of a library version.
///
/// Created once at profiling time, persisted, and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibProfile {
    pub description: LibraryDescription,
    pub package_tree: PackageTree,
    pub hash_trees: Vec<HashTree>,
}

impl LibProfile {
    pub fn new(
        description: LibraryDescription,
        package_tree: PackageTree,
        hash_trees: Vec<HashTree>,
    ) -> Self {
        Self {
            description,
            package_tree,
            hash_trees,
        }
    }

    /// Profile a library with the standard config set.
    ///
    /// Fails with [`ApiError::EmptyHashTree`] if no class survives filtering
    /// under the default config. Variant trees that end up empty (e.g. a
    /// library without public methods under the public-only filter) are
    /// dropped with a warning.
    pub fn create(
        hierarchy: &ClassHierarchy,
        description: LibraryDescription,
        verboseness: Verboseness,
    ) -> Result<Self, ApiError> {
        let package_tree = PackageTree::from_classes(hierarchy.app_classes());
        match package_tree.root_package() {
            Some(root) => debug!("Library {} root package: {}", description, root),
            None => warn!(
                "Library {} has no unique root package, partial matching will be disabled",
                description
            ),
        }
        debug!("Package tree of {}:\n{}", description, package_tree.render(true));

        let mut hash_trees = Vec::new();
        for config in TreeConfig::profile_set(verboseness) {
            let tree = HashTree::build(hierarchy, config);
            if tree.is_empty() {
                if config == TreeConfig::new() {
                    return Err(ApiError::EmptyHashTree(description.to_string()));
                }
                warn!("Skipping empty hash tree for {} ({})", description, config);
                continue;
            }
            hash_trees.push(tree);
        }

        info!(
            "Profiled {}: {} packages, {} hash trees",
            description,
            package_tree.number_of_non_empty_packages(),
            hash_trees.len()
        );
        Ok(Self::new(description, package_tree, hash_trees))
    }

    pub fn tree_by_config(&self, config: &TreeConfig) -> Option<&HashTree> {
        tree_by_config(&self.hash_trees, config)
    }

    pub fn root_package(&self) -> Option<String> {
        self.package_tree.root_package()
    }

    /// `(name, version)` pair identifying the profile
    pub fn identifier(&self) -> (&str, Option<&str>) {
        (&self.description.name, self.description.version.as_deref())
    }
}

/// Ordering by name, then numerically by version
pub fn compare_profiles(a: &LibProfile, b: &LibProfile) -> Ordering {
    a.description.name.cmp(&b.description.name).then_with(|| {
        version_compare(
            a.description.version_or_placeholder(),
            b.description.version_or_placeholder(),
        )
    })
}

/// Profile of the application under analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppProfile {
    pub package_tree: PackageTree,
    pub hash_trees: Vec<HashTree>,
    /// Package declared by the manifest; app packages under it are never
    /// considered library candidates
    pub package_name: Option<String>,
}

impl AppProfile {
    pub fn new(package_tree: PackageTree, hash_trees: Vec<HashTree>) -> Self {
        Self {
            package_tree,
            hash_trees,
            package_name: None,
        }
    }

    pub fn with_package_name(mut self, package_name: Option<String>) -> Self {
        self.package_name = package_name.filter(|p| !p.is_empty());
        self
    }

    /// Build the app's package tree and hash trees for every profile config
    pub fn create(hierarchy: &ClassHierarchy, verboseness: Verboseness) -> Self {
        let package_tree = PackageTree::from_classes(hierarchy.app_classes());
        debug!("App package tree:\n{}", package_tree.render(true));

        let hash_trees = TreeConfig::profile_set(verboseness)
            .into_iter()
            .map(|config| HashTree::build(hierarchy, config))
            .collect();
        Self::new(package_tree, hash_trees)
            .with_package_name(hierarchy.package_name().map(str::to_string))
    }

    pub fn tree_by_config(&self, config: &TreeConfig) -> Option<&HashTree> {
        tree_by_config(&self.hash_trees, config)
    }

    /// No app code survived filtering under any config
    pub fn is_empty(&self) -> bool {
        self.hash_trees.iter().all(HashTree::is_empty)
    }
}

/// Numeric comparison of dotted version strings, so that `1.10 > 1.6`.
///
/// Compares the first differing component numerically; if one version is a
/// prefix of the other, the longer one is greater. Non-numeric components
/// make the versions compare equal. `1.10` and `1.10.0` are not equal.
pub fn version_compare(a: &str, b: &str) -> Ordering {
    let lhs: Vec<&str> = a.split('.').collect();
    let rhs: Vec<&str> = b.split('.').collect();

    let i = lhs
        .iter()
        .zip(rhs.iter())
        .take_while(|(l, r)| l == r)
        .count();

    if i < lhs.len() && i < rhs.len() {
        match (lhs[i].parse::<u64>(), rhs[i].parse::<u64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            _ => Ordering::Equal,
        }
    } else {
        lhs.len().cmp(&rhs.len())
    }
}

/// Latest known version per library name
pub fn unique_libraries<'a, I>(profiles: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a LibProfile>,
{
    let mut result: BTreeMap<String, String> = BTreeMap::new();
    for profile in profiles {
        let name = &profile.description.name;
        let version = profile.description.version_or_placeholder();
        match result.get_mut(name) {
            Some(latest) => {
                if version_compare(latest, version) == Ordering::Less {
                    *latest = version.to_string();
                }
            }
            None => {
                result.insert(name.clone(), version.to_string());
            }
        }
    }
    result
}
