//! Profile store and catalog loading

use super::common::{library, scenario_classes};
use libsift::store::{FsProfileStore, LibraryCatalog, ProfileStore};
use tempfile::TempDir;

#[test]
fn stored_profiles_keep_their_hashes() {
    let dir = TempDir::new().unwrap();
    let store = FsProfileStore::new(dir.path());
    let profile = library("Foo Lib", "1.2.0", scenario_classes("com.foo"));

    let path = store.save(&profile).unwrap();
    assert!(path.ends_with("Utilities/Foo-Lib_1.2.0.libv"));

    let loaded = store.load(&path).unwrap();
    assert_eq!(loaded.description, profile.description);
    assert_eq!(loaded.hash_trees.len(), profile.hash_trees.len());
    for (a, b) in loaded.hash_trees.iter().zip(&profile.hash_trees) {
        assert_eq!(a.config(), b.config());
        assert_eq!(a.root_hash(), b.root_hash());
        assert_eq!(a.package_names(), b.package_names());
    }
    assert_eq!(loaded.root_package(), Some("com.foo".to_string()));
}

#[test]
fn catalog_skips_corrupt_profiles() {
    let dir = TempDir::new().unwrap();
    let store = FsProfileStore::new(dir.path());
    store
        .save(&library("foo", "1.0", scenario_classes("com.foo")))
        .unwrap();
    store
        .save(&library("bar", "2.0", scenario_classes("org.bar")))
        .unwrap();

    let broken = dir.path().join("Utilities").join("broken_1.0.libv");
    std::fs::write(&broken, b"definitely not a profile").unwrap();
    std::fs::write(dir.path().join("README.txt"), b"ignored").unwrap();

    let load = LibraryCatalog::load(&store).unwrap();
    assert_eq!(load.catalog.len(), 2);
    assert_eq!(load.skipped.len(), 1);
    assert_eq!(load.skipped[0].path, broken);

    let names: Vec<&str> = load
        .catalog
        .profiles()
        .iter()
        .map(|p| p.description.name.as_str())
        .collect();
    assert_eq!(names, vec!["bar", "foo"]);
}

#[test]
fn catalog_marks_outdated_versions() {
    let dir = TempDir::new().unwrap();
    let store = FsProfileStore::new(dir.path());
    for version in ["1.9", "1.10", "1.2"] {
        store
            .save(&library("foo", version, scenario_classes("com.foo")))
            .unwrap();
    }

    let catalog = LibraryCatalog::load(&store).unwrap().catalog;
    assert_eq!(catalog.latest_version("foo"), Some("1.10"));
    let deprecated: Vec<bool> = catalog
        .profiles()
        .iter()
        .map(|p| catalog.is_deprecated(p))
        .collect();
    assert_eq!(deprecated, vec![true, true, false]);
}
