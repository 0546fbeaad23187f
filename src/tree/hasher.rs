//! Hash computation for hash tree nodes

use super::node::Node;
use crate::hash::{compare_digests, HashAlgorithm};
use crate::types::NodeHash;

/// Hash the concatenation of `hashes`, in the order given
pub fn combine<'a, I>(algorithm: HashAlgorithm, hashes: I) -> NodeHash
where
    I: IntoIterator<Item = &'a NodeHash>,
{
    let mut buf = Vec::new();
    for h in hashes {
        buf.extend_from_slice(h.as_bytes());
    }
    algorithm.digest(&buf)
}

/// Put sibling nodes in canonical order: ascending by hash, labels breaking
/// ties. With `filter_dups` only the first node of each hash is kept.
pub fn canonicalize(nodes: &mut Vec<Node>, filter_dups: bool) {
    nodes.sort_by(|a, b| {
        compare_digests(a.hash().as_bytes(), b.hash().as_bytes())
            .then_with(|| a.label().cmp(&b.label()))
    });
    if filter_dups {
        nodes.dedup_by(|a, b| a.hash() == b.hash());
    }
}

/// Canonical hash over a set of sibling nodes
pub fn combine_nodes(algorithm: HashAlgorithm, nodes: &[Node]) -> NodeHash {
    combine(algorithm, nodes.iter().map(Node::hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(byte: u8) -> Node {
        Node::method(NodeHash::new(vec![byte]), None)
    }

    #[test]
    fn test_combine_is_order_sensitive() {
        let a = NodeHash::new(vec![1]);
        let b = NodeHash::new(vec![2]);
        let ab = combine(HashAlgorithm::Md5, [&a, &b]);
        let ba = combine(HashAlgorithm::Md5, [&b, &a]);
        assert_ne!(ab, ba);
        assert_eq!(ab, HashAlgorithm::Md5.digest(&[1, 2]));
    }

    #[test]
    fn test_canonicalize_sorts() {
        let mut nodes = vec![method(3), method(1), method(2), method(1)];
        canonicalize(&mut nodes, false);
        let bytes: Vec<u8> = nodes.iter().map(|n| n.hash().as_bytes()[0]).collect();
        assert_eq!(bytes, vec![1, 1, 2, 3]);
    }

    #[test]
    fn test_canonicalize_puts_shorter_prefix_first() {
        let mut nodes = vec![
            Node::method(NodeHash::new(vec![1, 2, 0]), None),
            Node::method(NodeHash::new(vec![2]), None),
            Node::method(NodeHash::new(vec![1, 2]), None),
        ];
        canonicalize(&mut nodes, false);
        let hashes: Vec<&[u8]> = nodes.iter().map(|n| n.hash().as_bytes()).collect();
        assert_eq!(hashes, vec![&[1u8, 2][..], &[1, 2, 0][..], &[2][..]]);
    }

    #[test]
    fn test_canonicalize_filters_dups() {
        let mut nodes = vec![method(3), method(1), method(3), method(1)];
        canonicalize(&mut nodes, true);
        let bytes: Vec<u8> = nodes.iter().map(|n| n.hash().as_bytes()[0]).collect();
        assert_eq!(bytes, vec![1, 3]);
    }
}
