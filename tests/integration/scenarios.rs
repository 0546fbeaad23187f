//! End-to-end matching scenarios

use super::common::{app, app_code, class, library, scenario_classes};
use libsift::access::AccessFlags;
use libsift::hierarchy::{ClassHierarchy, ClassInfo, MethodInfo};
use libsift::matching::LibraryMatcher;
use libsift::profile::{MatchLevel, SimScore, MATCH_HTREE_NONE};
use libsift::tree::{HashTree, TreeConfig};
use std::sync::Arc;

fn with_app_code(mut classes: Vec<ClassInfo>) -> Vec<ClassInfo> {
    classes.extend(app_code());
    classes
}

#[test]
fn identical_library_code_is_a_full_match() {
    let lib = Arc::new(library("foo", "1.0", scenario_classes("com.foo")));
    let app = app(with_app_code(scenario_classes("com.foo")));

    let config = TreeConfig::new();
    let m = LibraryMatcher::default()
        .match_trees(
            app.tree_by_config(&config).unwrap(),
            lib.tree_by_config(&config).unwrap(),
            lib.root_package().as_deref(),
        )
        .unwrap();
    assert_eq!(m.score, SimScore::Full);
    assert_eq!(m.score.value(), 1.0);
    assert_eq!(m.matched_nodes.len(), 2);

    let result = LibraryMatcher::default().match_profile(&app, lib);
    assert_eq!(result.classification(), MatchLevel::AllConfigs);
    assert!(!result.is_lib_obfuscated());
}

#[test]
fn renamed_packages_still_match_fully() {
    let lib = Arc::new(library("foo", "1.0", scenario_classes("com.foo")));
    let renamed = vec![
        class("x.y.a.a", &[&["I"], &["I", "J"]]),
        class("x.y.a.b", &[&["Ljava/lang/String;"]]),
        class("x.y.b.a", &[&["[B"], &["Z", "Z"]]),
    ];
    let app = app(with_app_code(renamed));

    let result = LibraryMatcher::default().match_profile(&app, lib);
    assert!(result.all_configs_match());
    assert!(result.is_lib_obfuscated());
    let mut packages = result.results()[0].matched_package_names();
    packages.sort();
    assert_eq!(packages, vec!["x.y.a", "x.y.b"]);
}

#[test]
fn diverging_code_is_a_partial_match() {
    let lib = Arc::new(library(
        "foo",
        "1.0",
        vec![
            class("com.foo.a.A1", &[&["I"]]),
            class("com.foo.a.A2", &[&["J"]]),
            class("com.foo.a.A3", &[&["Z"]]),
            class("com.foo.a.A4", &[&["B"]]),
            class("com.foo.b.B1", &[&["C"], &["[C"]]),
            class("com.foo.b.B2", &[&["S"]]),
            class("com.foo.b.B3", &[&["F"]]),
            class("com.foo.b.B4", &[&["D"]]),
        ],
    ));
    let app = app(with_app_code(vec![
        // one method added
        class("com.foo.a.A1", &[&["I"], &["[J"]]),
        class("com.foo.a.A2", &[&["J"]]),
        class("com.foo.a.A3", &[&["Z"]]),
        class("com.foo.a.A4", &[&["B"]]),
        // one method missing
        class("com.foo.b.B1", &[&["C"]]),
        class("com.foo.b.B2", &[&["S"]]),
        class("com.foo.b.B3", &[&["F"]]),
        class("com.foo.b.B4", &[&["D"]]),
    ]));

    let result = LibraryMatcher::default().match_profile(&app, lib);
    assert_eq!(result.classification(), MatchLevel::Partial);
    assert!(!result.results().is_empty());
    for r in result.results() {
        let score = r.score.value();
        assert!(r.score.is_partial(), "{:?}", r.score);
        assert!(score > 0.0 && score < 1.0);
        assert!((score - 0.75).abs() < 1e-6);
        assert_eq!(r.root_package.as_deref(), Some("com.foo"));
    }
}

#[test]
fn library_contained_in_larger_app_packages_is_a_full_match() {
    let lib_classes = vec![
        class("com.foo.a.A1", &[&["I"]]),
        class("com.foo.a.A2", &[&["J"]]),
        class("com.foo.b.B1", &[&["Z"]]),
        class("com.foo.b.B2", &[&["B"]]),
    ];
    let lib = Arc::new(library("foo", "1.0", lib_classes.clone()));
    let mut app_classes = lib_classes;
    app_classes.push(class("com.foo.a.Extra", &[&["[I"]]));
    app_classes.push(class("com.foo.b.Extra2", &[&["[Z"]]));
    let app = app(with_app_code(app_classes));

    let result = LibraryMatcher::default().match_profile(&app, lib);
    assert!(!result.results().is_empty());
    for r in result.results() {
        assert_eq!(r.score, SimScore::Full, "{}", r);
        assert!(!r.score.is_partial());
        assert_eq!(r.score.value(), 1.0);
        assert_eq!(r.root_package.as_deref(), Some("com.foo"));
        let mut packages = r.matched_package_names();
        packages.sort();
        assert_eq!(packages, vec!["com.foo.a", "com.foo.b"]);
    }
    assert_eq!(result.classification(), MatchLevel::AllConfigs);
    assert!(!result.is_partial_match());
    assert!(!result.is_lib_obfuscated());
}

#[test]
fn absent_library_scores_exactly_none() {
    let lib = Arc::new(library("foo", "1.0", scenario_classes("com.foo")));
    let app = app(app_code());

    let result = LibraryMatcher::default().match_profile(&app, lib);
    assert_eq!(result.classification(), MatchLevel::None);
    for r in result.results() {
        assert_eq!(r.score, SimScore::NoMatch);
        assert_eq!(r.score.value(), MATCH_HTREE_NONE);
        assert!(r.matched_nodes.is_empty());
    }
}

#[test]
fn injected_anonymous_constructor_argument_does_not_change_hash() {
    let build = |ctor_params: &[&str]| {
        let hierarchy = ClassHierarchy::new(vec![
            ClassInfo::new("com.fb.Base")
                .with_method(MethodInfo::new("onCreate", AccessFlags::PUBLIC).with_params(["I"])),
            ClassInfo::new("com.fb.Outer")
                .with_superclass("com.fb.Base")
                .with_method(MethodInfo::new("show", AccessFlags::PUBLIC).with_params(["Z"])),
            ClassInfo::new("com.fb.Outer$1").with_method(
                MethodInfo::new("<init>", AccessFlags::PACKAGE_PRIVATE)
                    .with_params(ctor_params.iter().copied()),
            ),
        ]);
        HashTree::build(&hierarchy, TreeConfig::new())
    };

    let javac = build(&["Lcom/fb/Outer;", "Landroid/content/Context;"]);
    let dx = build(&["Lcom/fb/Outer;", "Lcom/fb/Base;", "Landroid/content/Context;"]);
    assert_eq!(javac.root_hash(), dx.root_hash());

    // an unrelated extra argument is not elided
    let other = build(&["Lcom/fb/Outer;", "Lcom/fb/Outer;", "Landroid/content/Context;"]);
    assert_ne!(javac.root_hash(), other.root_hash());
}
