//! Partitions: hypothesized app root packages of a library

use super::candidates::{Candidate, CandidateList};
use super::MIN_CANDIDATE_COVERAGE;
use crate::pkg::{is_sub_package, package_depth, sub_package_of_depth};
use crate::tree::Node;
use std::collections::BTreeSet;

/// App package prefixes with as many segments as the library root package.
///
/// If several exist, those at or below the library root package itself are
/// preferred; when none is, all are kept.
pub fn partitions(app_packages: &[Node], lib_root_package: &str) -> BTreeSet<String> {
    let depth = package_depth(lib_root_package);
    let all: BTreeSet<String> = app_packages
        .iter()
        .filter_map(Node::package_name)
        .filter_map(|name| sub_package_of_depth(name, depth))
        .collect();

    if all.len() <= 1 {
        return all;
    }
    let preferred: BTreeSet<String> = all
        .iter()
        .filter(|p| is_sub_package(p, lib_root_package))
        .cloned()
        .collect();
    if preferred.is_empty() {
        all
    } else {
        preferred
    }
}

/// Restrict every candidate list to app packages under `partition` with the
/// same depth as the library package. List order is preserved.
///
/// `None` if fewer than half of the library packages keep a candidate.
pub fn restrict_to_partition<'a>(
    lists: &[CandidateList<'a>],
    partition: &str,
) -> Option<Vec<Vec<Candidate<'a>>>> {
    if lists.is_empty() {
        return None;
    }

    let restricted: Vec<Vec<Candidate<'a>>> = lists
        .iter()
        .map(|list| {
            let depth = package_depth(list.lib_package);
            list.candidates
                .iter()
                .filter(|c| is_sub_package(c.package, partition) && package_depth(c.package) == depth)
                .copied()
                .collect()
        })
        .collect();

    let with_candidates = restricted.iter().filter(|c| !c.is_empty()).count();
    let coverage = with_candidates as f32 / restricted.len() as f32;
    if coverage < MIN_CANDIDATE_COVERAGE {
        tracing::trace!(
            "Only {} / {} lib packages have candidates in partition {}, skipped",
            with_candidates,
            restricted.len(),
            partition
        );
        return None;
    }
    Some(restricted)
}
