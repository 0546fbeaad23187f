//! Candidate lists
//!
//! For every library package, the app packages similar enough to be the
//! library package under another name, best first.

use super::similarity::node_sim_score;
use super::MIN_CLAZZ_SCORE;
use crate::pkg::{is_sub_package, relationship, Relationship};
use crate::tree::Node;
use crate::types::Score;
use std::cmp::Ordering;
use std::fmt;

/// App package proposed for a library package
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub node: &'a Node,
    pub package: &'a str,
    pub score: Score,
}

impl fmt::Display for Candidate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3})", self.package, self.score)
    }
}

/// Candidates of one library package, sorted by descending score
#[derive(Debug, Clone)]
pub struct CandidateList<'a> {
    pub lib_node: &'a Node,
    pub lib_package: &'a str,
    pub candidates: Vec<Candidate<'a>>,
}

impl CandidateList<'_> {
    pub fn top(&self) -> Option<&Candidate<'_>> {
        self.candidates.first()
    }
}

impl fmt::Display for CandidateList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :", self.lib_package)?;
        for c in &self.candidates {
            write!(f, " {}", c)?;
        }
        Ok(())
    }
}

/// Build candidate lists for every named library package node.
///
/// App packages at or below `excluded_prefix` (the app's own package) are
/// never candidates. Only candidates scoring above [`MIN_CLAZZ_SCORE`] are
/// kept. Lists are ordered with empty lists last, then by descending top
/// score, then by top candidate name and library package name.
pub fn candidate_lists<'a>(
    lib_packages: &'a [Node],
    app_packages: &'a [Node],
    excluded_prefix: Option<&str>,
) -> Vec<CandidateList<'a>> {
    let app: Vec<(&'a Node, &'a str)> = app_packages
        .iter()
        .filter_map(|n| n.package_name().map(|name| (n, name)))
        .filter(|(_, name)| excluded_prefix.map_or(true, |prefix| !is_sub_package(name, prefix)))
        .collect();

    let mut lists: Vec<CandidateList<'a>> = lib_packages
        .iter()
        .filter_map(|lib| lib.package_name().map(|name| (lib, name)))
        .map(|(lib_node, lib_package)| {
            let mut candidates: Vec<Candidate<'a>> = app
                .iter()
                .filter_map(|&(node, package)| {
                    let score = node_sim_score(lib_node, node);
                    (score > MIN_CLAZZ_SCORE).then_some(Candidate {
                        node,
                        package,
                        score,
                    })
                })
                .collect();
            candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
            CandidateList {
                lib_node,
                lib_package,
                candidates,
            }
        })
        .collect();

    lists.sort_by(compare_lists);
    lists
}

fn compare_lists(a: &CandidateList<'_>, b: &CandidateList<'_>) -> Ordering {
    match (a.top(), b.top()) {
        (None, None) => a.lib_package.cmp(b.lib_package),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => y
            .score
            .total_cmp(&x.score)
            .then_with(|| x.package.cmp(y.package))
            .then_with(|| a.lib_package.cmp(b.lib_package)),
    }
}

/// Relationship of each pair of adjacent library packages, in list order
pub fn package_relationships(lists: &[CandidateList<'_>]) -> Vec<Relationship> {
    lists
        .windows(2)
        .map(|pair| relationship(pair[0].lib_package, pair[1].lib_package))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeHash;

    fn class(byte: u8) -> Node {
        Node::class(NodeHash::new(vec![byte]), None, Vec::new())
    }

    fn package(hash: u8, name: &str, classes: &[u8]) -> Node {
        Node::package(
            NodeHash::new(vec![hash]),
            Some(name.to_string()),
            classes.iter().map(|b| class(*b)).collect(),
        )
    }

    #[test]
    fn test_lists_sorted_and_thresholded() {
        let lib = vec![
            package(1, "com.lib.a", &[10, 11, 12, 13]),
            package(2, "com.lib.b", &[20, 21]),
            package(3, "com.lib.c", &[30, 31, 32]),
        ];
        let app = vec![
            package(101, "x.a", &[10, 11, 12, 99]), // 3/4 for a
            package(102, "x.b", &[20, 21, 98]),     // 1.0 for b
            package(103, "x.weak", &[13, 97, 96]),  // 1/4 for a, below threshold
        ];
        let lists = candidate_lists(&lib, &app, None);
        let order: Vec<&str> = lists.iter().map(|l| l.lib_package).collect();
        assert_eq!(order, vec!["com.lib.b", "com.lib.a", "com.lib.c"]);

        assert_eq!(lists[0].candidates.len(), 1);
        assert_eq!(lists[0].candidates[0].package, "x.b");
        assert_eq!(lists[1].candidates.len(), 1);
        assert!(lists[2].candidates.is_empty());
    }

    #[test]
    fn test_excludes_app_package() {
        let lib = vec![package(1, "com.lib", &[10])];
        let app = vec![
            package(1, "com.app.internal", &[10]),
            package(1, "com.appx", &[10]),
        ];
        let lists = candidate_lists(&lib, &app, Some("com.app"));
        let names: Vec<&str> = lists[0].candidates.iter().map(|c| c.package).collect();
        assert_eq!(names, vec!["com.appx"]);
    }

    #[test]
    fn test_relationships() {
        let lib = vec![
            package(1, "com.lib", &[10]),
            package(2, "com.lib.sub", &[20]),
            package(3, "com.lib.other", &[30]),
        ];
        let app = vec![
            package(1, "com.lib", &[10]),
            package(2, "com.lib.sub", &[20]),
            package(3, "com.lib.other", &[30]),
        ];
        let lists = candidate_lists(&lib, &app, None);
        // all top scores are 1.0, ordered by candidate name
        let order: Vec<&str> = lists.iter().map(|l| l.lib_package).collect();
        assert_eq!(order, vec!["com.lib", "com.lib.other", "com.lib.sub"]);
        assert_eq!(
            package_relationships(&lists),
            vec![Relationship::Child, Relationship::Sibling]
        );
    }
}
