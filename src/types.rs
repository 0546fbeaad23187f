//! Core types shared across the fingerprinting engine.

use crate::hash::compare_digests;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Digest of a hash-tree node.
///
/// Ordering is byte-lexicographic: the first differing byte decides, and on a
/// common prefix the shorter digest sorts first. Sibling hashes are sorted with
/// this order before being combined, which makes tree construction reproducible.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHash(Vec<u8>);

impl NodeHash {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Full lowercase hex rendering
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// First eight hex characters, for log lines
    pub fn short(&self) -> String {
        let hex = self.to_hex();
        hex[..hex.len().min(8)].to_string()
    }
}

impl Ord for NodeHash {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_digests(&self.0, &other.0)
    }
}

impl PartialOrd for NodeHash {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Vec<u8>> for NodeHash {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for NodeHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHash({})", self.short())
    }
}

/// Similarity score between two nodes or trees, in `[0, 1]`
pub type Score = f32;
