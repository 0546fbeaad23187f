//! Property tests of hash tree construction and matching

use libsift::access::AccessFlags;
use libsift::hash::{compare_digests, HashAlgorithm};
use libsift::hierarchy::{ClassHierarchy, ClassInfo, MethodInfo};
use libsift::matching::{node_sim_score, LibraryMatcher};
use libsift::profile::SimScore;
use libsift::tree::{tree_by_config, HashTree, Node, TreeConfig};
use libsift::types::NodeHash;
use std::cmp::Ordering;
use proptest::prelude::*;

const TYPES: &[&str] = &["I", "J", "Z", "B", "C", "S", "F", "D", "[I", "Ljava/lang/String;"];

fn arb_method() -> impl Strategy<Value = MethodInfo> {
    (
        prop::collection::vec(0..TYPES.len(), 0..4),
        0..TYPES.len(),
        any::<bool>(),
    )
        .prop_map(|(params, ret, public)| {
            let access = if public {
                AccessFlags::PUBLIC
            } else {
                AccessFlags::PRIVATE
            };
            MethodInfo::new("m", access)
                .with_params(params.into_iter().map(|i| TYPES[i]))
                .returning(TYPES[ret])
        })
}

/// Classes with unique names spread over a few packages
fn arb_classes() -> impl Strategy<Value = Vec<ClassInfo>> {
    prop::collection::vec(
        (0..4usize, prop::collection::vec(arb_method(), 1..4)),
        1..12,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (pkg, methods))| {
                methods
                    .into_iter()
                    .fold(ClassInfo::new(format!("com.lib.p{}.C{}", pkg, i)), |c, m| {
                        c.with_method(m)
                    })
            })
            .collect()
    })
}

fn arb_config() -> impl Strategy<Value = TreeConfig> {
    (any::<bool>(), any::<bool>(), 0..3usize).prop_map(|(public_only, dups, alg)| {
        let algorithm = [HashAlgorithm::Md5, HashAlgorithm::Sha256, HashAlgorithm::Blake3][alg];
        let config = TreeConfig::new()
            .with_algorithm(algorithm)
            .with_filter_dups(dups);
        if public_only {
            config.public_only()
        } else {
            config
        }
    })
}

proptest! {
    #[test]
    fn digest_order_is_total_and_lexicographic(
        a in prop::collection::vec(any::<u8>(), 0..20),
        b in prop::collection::vec(any::<u8>(), 0..20),
    ) {
        let ord = compare_digests(&a, &b);
        prop_assert_eq!(ord, a.cmp(&b));
        prop_assert_eq!(compare_digests(&b, &a), ord.reverse());
        prop_assert_eq!(ord == Ordering::Equal, a == b);
        prop_assert_eq!(NodeHash::new(a.clone()).cmp(&NodeHash::new(b.clone())), ord);
    }

    #[test]
    fn build_is_deterministic(classes in arb_classes(), config in arb_config()) {
        let hierarchy = ClassHierarchy::new(classes);
        let a = HashTree::build(&hierarchy, config);
        let b = HashTree::build(&hierarchy, config);
        prop_assert_eq!(a.root_hash(), b.root_hash());
    }

    #[test]
    fn build_ignores_class_order(classes in arb_classes(), config in arb_config(), shift in 0..12usize) {
        let forward = HashTree::build(&ClassHierarchy::new(classes.clone()), config);

        let mut permuted = classes;
        permuted.reverse();
        let len = permuted.len();
        permuted.rotate_left(shift % len);
        let shuffled = HashTree::build(&ClassHierarchy::new(permuted), config);
        prop_assert_eq!(forward.root_hash(), shuffled.root_hash());
    }

    #[test]
    fn non_empty_tree_matches_itself(classes in arb_classes()) {
        let tree = HashTree::build(&ClassHierarchy::new(classes), TreeConfig::new());
        prop_assume!(!tree.is_empty());
        let m = LibraryMatcher::default().match_trees(&tree, &tree, None).unwrap();
        prop_assert_eq!(m.score, SimScore::Full);
        for package in tree.package_nodes() {
            prop_assert_eq!(node_sim_score(package, package), 1.0);
        }
    }

    #[test]
    fn tree_by_config_returns_only_equal_configs(classes in arb_classes(), query in arb_config()) {
        let hierarchy = ClassHierarchy::new(classes);
        let trees: Vec<HashTree> = [
            TreeConfig::new(),
            TreeConfig::new().public_only(),
            TreeConfig::new().with_filter_dups(true),
            TreeConfig::new().public_only().with_filter_dups(true),
        ]
        .into_iter()
        .map(|c| HashTree::build(&hierarchy, c))
        .collect();

        match tree_by_config(&trees, &query) {
            Some(tree) => prop_assert_eq!(tree.config(), &query),
            None => prop_assert!(trees.iter().all(|t| t.config() != &query)),
        }
    }
}

#[test]
fn different_node_levels_never_match() {
    let hierarchy = ClassHierarchy::new(vec![ClassInfo::new("com.lib.A")
        .with_method(MethodInfo::new("m", AccessFlags::PUBLIC).with_params(["I"]))]);
    let tree = HashTree::build(&hierarchy, TreeConfig::new());
    let package: &Node = &tree.package_nodes()[0];
    let class: &Node = &package.children()[0];
    assert_eq!(node_sim_score(package, class), 0.0);
    assert_eq!(node_sim_score(class, package), 0.0);
    assert_eq!(node_sim_score(class, class), 1.0);
}
