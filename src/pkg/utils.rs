//! Dotted package-name helpers.

use serde::{Deserialize, Serialize};

/// Package part of a dotted class name (`com.foo.Bar` -> `com.foo`)
pub fn parse_package(class_name: &str) -> &str {
    match class_name.rfind('.') {
        Some(idx) => &class_name[..idx],
        None => "",
    }
}

/// Segments of a dotted package name; the default package has none
pub fn segments(package: &str) -> impl Iterator<Item = &str> {
    package.split('.').filter(|s| !s.is_empty())
}

/// Number of segments, e.g. `com.foo.bar` has depth 3
pub fn package_depth(package: &str) -> usize {
    segments(package).count()
}

/// Prefix of `package` with exactly `depth` segments, if it is deep enough.
///
/// A package of exactly `depth` segments is returned unchanged, so an app
/// package at the library root depth is its own partition candidate.
pub fn sub_package_of_depth(package: &str, depth: usize) -> Option<String> {
    if depth == 0 || package_depth(package) < depth {
        return None;
    }
    Some(segments(package).take(depth).collect::<Vec<_>>().join("."))
}

/// Parent package, empty for top-level packages
pub fn parent_package(package: &str) -> &str {
    parse_package(package)
}

/// Segment-aware prefix test: `com.foo` contains `com.foo.bar` but not `com.foobar`
pub fn is_sub_package(package: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    package == prefix
        || (package.len() > prefix.len()
            && package.starts_with(prefix)
            && package.as_bytes()[prefix.len()] == b'.')
}

/// Structural relationship between two packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relationship {
    /// The second package is an ancestor of the first
    Parent,
    /// The second package is a descendant of the first
    Child,
    /// Same depth, same parent package
    Sibling,
    Unrelated,
}

/// Relationship of `first` and `second`, judged by package-name prefixes
pub fn relationship(first: &str, second: &str) -> Relationship {
    let d1 = package_depth(first);
    let d2 = package_depth(second);

    if d1 > d2 && is_sub_package(first, second) {
        Relationship::Parent
    } else if d2 > d1 && is_sub_package(second, first) {
        Relationship::Child
    } else if d1 == d2 && parent_package(first) == parent_package(second) {
        Relationship::Sibling
    } else {
        Relationship::Unrelated
    }
}
