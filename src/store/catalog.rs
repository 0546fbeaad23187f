//! Read-only library catalog

use super::ProfileStore;
use crate::error::StorageError;
use crate::profile::{compare_profiles, unique_libraries, LibProfile};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Profile that could not be loaded
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of loading a catalog: the usable profiles plus what was skipped
#[derive(Debug)]
pub struct CatalogLoad {
    pub catalog: LibraryCatalog,
    pub skipped: Vec<SkippedEntry>,
}

/// Immutable set of library profiles shared by all matching tasks.
///
/// Profiles are ordered by name and numeric version.
#[derive(Debug, Clone, Default)]
pub struct LibraryCatalog {
    profiles: Vec<Arc<LibProfile>>,
    latest: BTreeMap<String, String>,
}

impl LibraryCatalog {
    pub fn from_profiles(mut profiles: Vec<LibProfile>) -> Self {
        profiles.sort_by(compare_profiles);
        let latest = unique_libraries(&profiles);
        Self {
            profiles: profiles.into_iter().map(Arc::new).collect(),
            latest,
        }
    }

    /// Load every profile of `store`. Unreadable or corrupt entries are
    /// logged and reported in [`CatalogLoad::skipped`]; only a failure to
    /// list the store aborts the load.
    pub fn load(store: &dyn ProfileStore) -> Result<CatalogLoad, StorageError> {
        let paths = store.list()?;
        let mut profiles = Vec::with_capacity(paths.len());
        let mut skipped = Vec::new();

        for path in paths {
            match store.load(&path) {
                Ok(profile) => profiles.push(profile),
                Err(e) => {
                    warn!("Skipping library profile {}: {}", path.display(), e);
                    skipped.push(SkippedEntry {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let catalog = Self::from_profiles(profiles);
        info!(
            "Loaded {} library profiles ({} unique libraries, {} skipped)",
            catalog.len(),
            catalog.latest.len(),
            skipped.len()
        );
        Ok(CatalogLoad { catalog, skipped })
    }

    pub fn profiles(&self) -> &[Arc<LibProfile>] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Latest version per library name
    pub fn unique_libraries(&self) -> &BTreeMap<String, String> {
        &self.latest
    }

    pub fn latest_version(&self, name: &str) -> Option<&str> {
        self.latest.get(name).map(String::as_str)
    }

    /// Whether a newer version of `profile`'s library is in the catalog
    pub fn is_deprecated(&self, profile: &LibProfile) -> bool {
        self.latest_version(&profile.description.name)
            .is_some_and(|latest| latest != profile.description.version_or_placeholder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::PackageTree;
    use crate::profile::{LibraryCategory, LibraryDescription};

    fn lib(name: &str, version: &str) -> LibProfile {
        LibProfile::new(
            LibraryDescription::new(name, LibraryCategory::Utilities).with_version(version),
            PackageTree::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_catalog_order_and_deprecation() {
        let catalog = LibraryCatalog::from_profiles(vec![
            lib("okhttp", "3.10.0"),
            lib("gson", "2.8.0"),
            lib("okhttp", "3.9.0"),
        ]);
        let names: Vec<String> = catalog
            .profiles()
            .iter()
            .map(|p| p.description.to_string())
            .collect();
        assert_eq!(names, vec!["gson (2.8.0)", "okhttp (3.9.0)", "okhttp (3.10.0)"]);
        assert!(catalog.is_deprecated(&catalog.profiles()[1]));
        assert!(!catalog.is_deprecated(&catalog.profiles()[2]));
        assert_eq!(catalog.latest_version("gson"), Some("2.8.0"));
    }
}
