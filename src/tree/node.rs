//! Hash tree node types

use crate::types::NodeHash;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Level of a node in the hash tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLevel {
    Root,
    Package,
    Class,
    Method,
}

/// Level tag with the level's optional human-readable metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Package { name: Option<String> },
    Class { name: Option<String> },
    Method { signature: Option<String> },
}

impl NodeKind {
    pub fn level(&self) -> NodeLevel {
        match self {
            NodeKind::Root => NodeLevel::Root,
            NodeKind::Package { .. } => NodeLevel::Package,
            NodeKind::Class { .. } => NodeLevel::Class,
            NodeKind::Method { .. } => NodeLevel::Method,
        }
    }

    /// Package name, class name or method signature, if retained
    pub fn label(&self) -> Option<&str> {
        match self {
            NodeKind::Root => None,
            NodeKind::Package { name } | NodeKind::Class { name } => name.as_deref(),
            NodeKind::Method { signature } => signature.as_deref(),
        }
    }
}

/// Hash tree node. Owns its children; there are no parent links.
///
/// Equality is hash equality: two nodes are the same if their hashes match,
/// whatever names they carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    hash: NodeHash,
    kind: NodeKind,
    children: Vec<Node>,
}

impl Node {
    pub fn new(hash: NodeHash, kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            hash,
            kind,
            children,
        }
    }

    pub fn root(hash: NodeHash, packages: Vec<Node>) -> Self {
        Self::new(hash, NodeKind::Root, packages)
    }

    pub fn package(hash: NodeHash, name: Option<String>, classes: Vec<Node>) -> Self {
        Self::new(hash, NodeKind::Package { name }, classes)
    }

    pub fn class(hash: NodeHash, name: Option<String>, methods: Vec<Node>) -> Self {
        Self::new(hash, NodeKind::Class { name }, methods)
    }

    pub fn method(hash: NodeHash, signature: Option<String>) -> Self {
        Self::new(hash, NodeKind::Method { signature }, Vec::new())
    }

    pub fn hash(&self) -> &NodeHash {
        &self.hash
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn level(&self) -> NodeLevel {
        self.kind.level()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn label(&self) -> Option<&str> {
        self.kind.label()
    }

    /// Package name of a package node
    pub fn package_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Package { name } => name.as_deref(),
            _ => None,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}
