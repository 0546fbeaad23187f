//! Node similarity

use crate::tree::Node;
use crate::types::Score;
use std::collections::HashSet;

/// Similarity of `lib` to `app`.
///
/// 0 for nodes of different levels, 1 for equal hashes, otherwise the
/// fraction of `lib`'s children whose hash appears among `app`'s children.
/// The measure is asymmetric: extra children on the app side do not lower
/// the score. A node without retained children only matches on its hash.
pub fn node_sim_score(lib: &Node, app: &Node) -> Score {
    if lib.level() != app.level() {
        return 0.0;
    }
    if lib.hash() == app.hash() {
        return 1.0;
    }
    if lib.is_leaf() {
        return 0.0;
    }

    let app_children: HashSet<_> = app.children().iter().map(Node::hash).collect();
    let matched = lib
        .children()
        .iter()
        .filter(|c| app_children.contains(c.hash()))
        .count();
    matched as Score / lib.num_children() as Score
}
