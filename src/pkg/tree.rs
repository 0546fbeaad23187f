//! Package tree
//!
//! A prefix tree over dotted package names. Every node carries the number of
//! classes declared directly in that package. Used to infer the root package
//! of a library, to test package containment and to locate a library's package
//! layout inside an application, by name or by shape alone.

use super::utils::{is_sub_package, parse_package, segments};
use crate::hierarchy::ClassInfo;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::{trace, warn};

/// Name of the synthetic root node
pub const ROOT_NAME: &str = "Root";

/// Deepest package nesting accepted by [`PackageTree::update`]
pub const MAX_PACKAGE_DEPTH: usize = 64;

/// Top-level namespaces too generic to serve as a library root package
pub const AMBIGUOUS_NAMESPACES: [&str; 3] = ["com", "org", "de"];

fn is_ambiguous_namespace(name: &str) -> bool {
    AMBIGUOUS_NAMESPACES.contains(&name)
}

/// One package segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageTreeNode {
    name: String,
    class_count: usize,
    children: Vec<PackageTreeNode>,
}

impl PackageTreeNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_count: 0,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_count(&self) -> usize {
        self.class_count
    }

    pub fn children(&self) -> &[PackageTreeNode] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&PackageTreeNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn has_classes(&self) -> bool {
        self.class_count > 0
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of direct children without children of their own
    pub fn leaf_count(&self) -> usize {
        self.children.iter().filter(|c| c.is_leaf()).count()
    }

    /// Number of nodes in this subtree, including this one
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// Package layout of a code unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageTree {
    root: PackageTreeNode,
}

/// A subtree of a larger tree whose shape matches a search tree
#[derive(Debug, Clone)]
pub struct ShapeMatch {
    /// Package at which the match is anchored, empty for the root
    pub package: String,
    /// Copy of the matched subtree, including the path down to `package`
    pub subtree: PackageTree,
}

impl PackageTree {
    pub fn new() -> Self {
        Self {
            root: PackageTreeNode::new(ROOT_NAME),
        }
    }

    /// Build from classes, one class-count increment per class
    pub fn from_classes<'a, I>(classes: I) -> Self
    where
        I: IntoIterator<Item = &'a ClassInfo>,
    {
        let mut tree = Self::new();
        for class in classes {
            tree.update(class.package_name());
        }
        tree
    }

    /// Build from dotted class names
    pub fn from_class_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for name in names {
            tree.update(parse_package(name.as_ref()));
        }
        tree
    }

    /// Build from package names, counting one class per occurrence
    pub fn from_packages<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for package in packages {
            tree.update(package.as_ref());
        }
        tree
    }

    pub fn root(&self) -> &PackageTreeNode {
        &self.root
    }

    /// Record one class in `package`, creating missing nodes.
    ///
    /// Returns false (and leaves the tree unchanged) for packages nested deeper
    /// than [`MAX_PACKAGE_DEPTH`].
    pub fn update(&mut self, package: &str) -> bool {
        let path: Vec<&str> = segments(package).collect();
        if path.len() > MAX_PACKAGE_DEPTH {
            warn!(
                "Package {} exceeds maximum depth {}, ignored",
                package, MAX_PACKAGE_DEPTH
            );
            return false;
        }

        let mut cur = &mut self.root;
        for seg in path {
            let idx = match cur.children.iter().position(|c| c.name == seg) {
                Some(idx) => idx,
                None => {
                    cur.children.push(PackageTreeNode::new(seg));
                    cur.children.len() - 1
                }
            };
            cur = &mut cur.children[idx];
        }
        cur.class_count += 1;
        true
    }

    /// Node for a dotted package name; the empty name is the root
    pub fn locate(&self, package: &str) -> Option<&PackageTreeNode> {
        let mut cur = &self.root;
        for seg in segments(package) {
            cur = cur.child(seg)?;
        }
        Some(cur)
    }

    pub fn contains_package(&self, package: &str) -> bool {
        self.locate(package).is_some()
    }

    /// Infer the library root package.
    ///
    /// Descends while the current node has a single child and no classes.
    /// When the tree starts with several top-level packages, or with a single
    /// generic namespace (`com`, `org`, `de`), the child with the most packages
    /// below it is taken as the real root first. Returns `None` when no unique
    /// root package can be determined.
    pub fn root_package(&self) -> Option<String> {
        let mut path: Vec<&str> = Vec::new();
        let mut cur = &self.root;

        let ambiguous_start = cur.children.len() > 1
            || (cur.children.len() == 1 && is_ambiguous_namespace(&cur.children[0].name));
        if ambiguous_start {
            if cur.children.len() == 1 {
                cur = &cur.children[0];
                path.push(&cur.name);
            }

            let mut largest: Option<(&PackageTreeNode, usize)> = None;
            for child in &cur.children {
                let size = child.subtree_size();
                if largest.map_or(true, |(_, max)| size > max) {
                    largest = Some((child, size));
                }
            }
            if let Some((child, _)) = largest {
                cur = child;
                path.push(&cur.name);
                if cur.has_classes() {
                    return Self::finish_root_package(&path);
                }
            }
        }

        while cur.children.len() == 1 {
            cur = &cur.children[0];
            path.push(&cur.name);
            if cur.has_classes() {
                break;
            }
        }

        Self::finish_root_package(&path)
    }

    fn finish_root_package(path: &[&str]) -> Option<String> {
        let package = path.join(".");
        if package.is_empty() || is_ambiguous_namespace(&package) {
            None
        } else {
            Some(package)
        }
    }

    /// Longest prefix of `package` along which no package declares classes
    pub fn locate_root_package_for(&self, package: &str) -> Option<String> {
        let mut path: Vec<&str> = Vec::new();
        let mut cur = &self.root;
        for seg in segments(package) {
            let next = cur.child(seg)?;
            if next.has_classes() {
                break;
            }
            path.push(&next.name);
            cur = next;
        }
        Some(path.join("."))
    }

    /// Packages that declare at least one class, with their class counts
    pub fn packages(&self) -> BTreeMap<String, usize> {
        let mut result = BTreeMap::new();
        self.walk(|package, node| {
            if node.has_classes() {
                result.insert(package.to_string(), node.class_count);
            }
        });
        result
    }

    /// Every package encoded in the tree, including intermediate ones
    pub fn all_packages(&self) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        self.walk(|package, _| {
            if !package.is_empty() {
                result.insert(package.to_string());
            }
        });
        result
    }

    pub fn number_of_non_empty_packages(&self) -> usize {
        self.packages().len()
    }

    pub fn number_of_app_classes(&self) -> usize {
        self.packages().values().sum()
    }

    /// Deepest nesting level present in the tree
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        max
    }

    /// Pre-order traversal with the dotted package name of each node
    fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&str, &'a PackageTreeNode),
    {
        let mut stack: Vec<(String, &PackageTreeNode)> = vec![(String::new(), &self.root)];
        while let Some((package, node)) = stack.pop() {
            visit(&package, node);
            for child in node.children.iter().rev() {
                stack.push((join(&package, &child.name), child));
            }
        }
    }

    /// Copy of the subtree at `package`, together with the path leading to it
    pub fn subtree_copy(&self, package: &str) -> Option<PackageTree> {
        let target = self.locate(package)?;
        let mut copy = target.clone();

        // rebuild the path from the target upwards
        let path: Vec<&str> = segments(package).collect();
        for depth in (0..path.len()).rev() {
            let prefix = path[..depth].join(".");
            let ancestor = self.locate(&prefix)?;
            let mut node = PackageTreeNode::new(ancestor.name.clone());
            node.class_count = ancestor.class_count;
            node.children.push(copy);
            copy = node;
        }
        Some(PackageTree { root: copy })
    }

    /// Find `search` inside this tree by package names.
    ///
    /// The search tree is anchored at its root package. The match succeeds at a
    /// node carrying the same name whose descendants include every package of
    /// the anchor's subtree (this tree may have more, never fewer). The node at
    /// the anchor's own path is tried first. Returns the matched package.
    pub fn match_subtree_by_name(&self, search: &PackageTree) -> Option<String> {
        let anchor_package = search.root_package().unwrap_or_default();
        let anchor = search.locate(&anchor_package)?;

        if let Some(node) = self.locate(&anchor_package) {
            if contains_by_name(node, anchor) {
                return Some(anchor_package);
            }
        }
        if anchor_package.is_empty() {
            return None;
        }

        let mut stack: Vec<(String, &PackageTreeNode)> = vec![(String::new(), &self.root)];
        while let Some((package, node)) = stack.pop() {
            if node.name == anchor.name && package != anchor_package && contains_by_name(node, anchor) {
                trace!("Subtree {} found by name at {}", anchor_package, package);
                return Some(package);
            }
            for child in node.children.iter().rev() {
                stack.push((join(&package, &child.name), child));
            }
        }
        None
    }

    /// Find every subtree of this tree shaped like `search`.
    ///
    /// Only fan-out is compared: the number of children and of leaf children,
    /// recursively. Names are ignored, which detects renamed package layouts.
    /// Matches do not overlap: the subtree of a match is not searched again.
    pub fn match_subtree_by_shape(&self, search: &PackageTree) -> Vec<ShapeMatch> {
        let anchor_package = search.root_package().unwrap_or_default();
        let Some(anchor) = search.locate(&anchor_package) else {
            return Vec::new();
        };

        let mut matcher = ShapeMatcher::default();
        let mut result = Vec::new();
        let mut stack: Vec<(String, &PackageTreeNode)> = vec![(String::new(), &self.root)];
        while let Some((package, node)) = stack.pop() {
            if matcher.matches(node, &package, anchor, &anchor_package) {
                if let Some(subtree) = self.subtree_copy(&package) {
                    trace!("Subtree shape of {} found at {}", anchor_package, package);
                    result.push(ShapeMatch { package, subtree });
                }
                continue;
            }
            for child in node.children.iter().rev() {
                stack.push((join(&package, &child.name), child));
            }
        }
        result
    }

    /// Render the tree with box-drawing characters
    pub fn render(&self, include_class_counts: bool) -> String {
        let mut out = String::new();
        let mut stack: Vec<(&PackageTreeNode, String, bool)> = vec![(&self.root, String::new(), true)];
        while let Some((node, prefix, is_tail)) = stack.pop() {
            out.push_str(&prefix);
            out.push_str(if is_tail { "└── " } else { "├── " });
            out.push_str(&node.name);
            if include_class_counts && node.has_classes() {
                out.push_str(&format!(" ({})", node.class_count));
            }
            out.push('\n');

            let child_prefix = format!("{}{}", prefix, if is_tail { "    " } else { "│   " });
            let last = node.children.len().saturating_sub(1);
            for (i, child) in node.children.iter().enumerate().rev() {
                stack.push((child, child_prefix.clone(), i == last));
            }
        }
        out
    }
}

impl Default for PackageTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Trees are equal when they encode the same set of packages
impl PartialEq for PackageTree {
    fn eq(&self, other: &Self) -> bool {
        self.all_packages() == other.all_packages()
    }
}

impl Eq for PackageTree {}

impl fmt::Display for PackageTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root_package() {
            Some(p) => f.write_str(&p),
            None => f.write_str("- none -"),
        }
    }
}

fn join(package: &str, segment: &str) -> String {
    if package.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", package, segment)
    }
}

/// Whether every package below `test` also exists below `game`, by name
fn contains_by_name(game: &PackageTreeNode, test: &PackageTreeNode) -> bool {
    let mut stack = vec![(game, test)];
    while let Some((g, t)) = stack.pop() {
        if g.children.len() < t.children.len() {
            return false;
        }
        for tc in &t.children {
            match g.child(&tc.name) {
                Some(gc) => stack.push((gc, tc)),
                None => return false,
            }
        }
    }
    true
}

/// Shape comparison memoized on (game path, test path)
#[derive(Default)]
struct ShapeMatcher {
    visited: HashMap<(String, String), bool>,
}

impl ShapeMatcher {
    fn matches(
        &mut self,
        game: &PackageTreeNode,
        game_path: &str,
        test: &PackageTreeNode,
        test_path: &str,
    ) -> bool {
        let key = (game_path.to_string(), test_path.to_string());
        if let Some(&known) = self.visited.get(&key) {
            return known;
        }
        let result = self.compute(game, game_path, test, test_path);
        self.visited.insert(key, result);
        result
    }

    // Recursion depth is bounded by the depth of `test`, which never exceeds
    // MAX_PACKAGE_DEPTH for trees built through `update`.
    fn compute(
        &mut self,
        game: &PackageTreeNode,
        game_path: &str,
        test: &PackageTreeNode,
        test_path: &str,
    ) -> bool {
        if game.children.len() < test.children.len() || game.leaf_count() < test.leaf_count() {
            return false;
        }

        // same fan-out and every child a leaf: structural match
        if game.children.len() == test.children.len()
            && game.leaf_count() == test.leaf_count()
            && game.children.len() == game.leaf_count()
        {
            return true;
        }

        for tc in &test.children {
            let tc_path = join(test_path, &tc.name);
            let found = game
                .children
                .iter()
                .any(|gc| self.matches(gc, &join(game_path, &gc.name), tc, &tc_path));
            if !found {
                return false;
            }
        }

        game.is_leaf() == test.is_leaf()
    }
}
