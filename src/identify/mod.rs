//! Identification of the libraries contained in an application.
//!
//! Runs the matching engine for every catalog profile. Comparisons are
//! independent, so each library is matched on its own blocking task holding
//! `Arc` clones of the app profile and the library profile. Results are
//! gathered at the end and put back into catalog order.

pub mod report;

pub use report::{IdentificationReport, LevelCounts, ReportJson};

use crate::error::ApiError;
use crate::matching::{LibraryMatcher, MatchOptions};
use crate::profile::{AppProfile, HTreeMatch, LibProfile, ProfileMatch, SimScore};
use crate::store::LibraryCatalog;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Root packages too generic to indicate a library on their own
pub const DEFAULT_AMBIGUOUS_ROOT_PACKAGES: &[&str] = &[
    "com.google",
    "com.google.android",
    "com.google.android.gms",
    "android.support",
];

/// Knobs of an identification run
#[derive(Debug, Clone)]
pub struct IdentifyOptions {
    pub matching: MatchOptions,
    /// Library root packages skipped by the root package presence scan
    pub ambiguous_root_packages: Vec<String>,
    /// Libraries not started within this time are reported as timed out
    pub deadline: Option<Duration>,
}

impl Default for IdentifyOptions {
    fn default() -> Self {
        Self {
            matching: MatchOptions::default(),
            ambiguous_root_packages: DEFAULT_AMBIGUOUS_ROOT_PACKAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            deadline: None,
        }
    }
}

impl IdentifyOptions {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn is_ambiguous(&self, root_package: &str) -> bool {
        self.ambiguous_root_packages.iter().any(|p| p == root_package)
    }
}

/// Libraries whose root package occurs verbatim in the app.
///
/// Cheap heuristic run before matching. Libraries without a unique root
/// package or with an ambiguous one are skipped.
pub fn scan_root_packages(
    app: &AppProfile,
    catalog: &LibraryCatalog,
    options: &IdentifyOptions,
) -> BTreeSet<usize> {
    catalog
        .profiles()
        .iter()
        .enumerate()
        .filter_map(|(idx, lib)| {
            let root = lib.root_package()?;
            if options.is_ambiguous(&root) {
                debug!("Skipping ambiguous root package {} of {}", root, lib.description);
                return None;
            }
            app.package_tree.contains_package(&root).then(|| {
                debug!("Root package {} of {} found in app", root, lib.description);
                idx
            })
        })
        .collect()
}

/// Match `app` against every profile of `catalog`.
///
/// Fails with [`ApiError::EmptyHashTree`] if the app has no usable class,
/// and with [`ApiError::TaskFailed`] if a matching task panicked.
pub async fn identify_libraries(
    app: Arc<AppProfile>,
    catalog: &LibraryCatalog,
    options: &IdentifyOptions,
) -> Result<IdentificationReport, ApiError> {
    if app.is_empty() {
        return Err(ApiError::EmptyHashTree("application".to_string()));
    }
    let started = Instant::now();
    let deadline = options.deadline.map(|d| started + d);

    let mut matching = options.matching.clone();
    if matching.app_package.is_none() {
        matching.app_package = app.package_name.clone();
    }
    let matcher = Arc::new(LibraryMatcher::new(matching));

    let present = scan_root_packages(&app, catalog, options);
    info!(
        "Root packages of {} / {} libraries present in app",
        present.len(),
        catalog.len()
    );

    let mut tasks = JoinSet::new();
    for (idx, lib) in catalog.profiles().iter().enumerate() {
        let app = Arc::clone(&app);
        let lib = Arc::clone(lib);
        let matcher = Arc::clone(&matcher);
        let root_present = present.contains(&idx);
        let deprecated = catalog.is_deprecated(&lib);
        tasks.spawn_blocking(move || {
            let mut result = match deadline {
                Some(deadline) if Instant::now() >= deadline => timed_out(&app, lib),
                _ => matcher.match_profile(&app, lib),
            };
            result.lib_root_package_present = root_present;
            result.is_deprecated = deprecated;
            (idx, result)
        });
    }

    let mut slots: Vec<Option<ProfileMatch>> = vec![None; catalog.len()];
    loop {
        let joined = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("Identification deadline passed, {} libraries pending", tasks.len());
                    tasks.abort_all();
                    break;
                }
            },
            None => tasks.join_next().await,
        };
        let Some(joined) = joined else {
            break;
        };
        match joined {
            Ok((idx, result)) => slots[idx] = Some(result),
            Err(e) if e.is_cancelled() => debug!("Matching task cancelled: {}", e),
            Err(e) => return Err(ApiError::TaskFailed(e.to_string())),
        }
    }

    let matches: Vec<ProfileMatch> = slots
        .into_iter()
        .zip(catalog.profiles())
        .enumerate()
        .map(|(idx, (slot, lib))| {
            slot.unwrap_or_else(|| {
                let mut result = timed_out(&app, Arc::clone(lib));
                result.lib_root_package_present = present.contains(&idx);
                result.is_deprecated = catalog.is_deprecated(lib);
                result
            })
        })
        .collect();

    let report = IdentificationReport::new(app.package_name.clone(), matches, started.elapsed());
    info!("{}", report.counts());
    Ok(report)
}

/// No-match result for every app config, flagged as timed out
fn timed_out(app: &AppProfile, lib: Arc<LibProfile>) -> ProfileMatch {
    let mut result = ProfileMatch::new(lib);
    for tree in &app.hash_trees {
        result.add_result(HTreeMatch::new(*tree.config(), SimScore::NoMatch));
    }
    result.timed_out = true;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessFlags;
    use crate::hierarchy::{ClassHierarchy, ClassInfo, MethodInfo};
    use crate::profile::{LibraryCategory, LibraryDescription, MatchLevel};
    use crate::tree::Verboseness;

    fn class(name: &str, param: &str) -> ClassInfo {
        ClassInfo::new(name).with_method(MethodInfo::new("run", AccessFlags::PUBLIC).with_params([param]))
    }

    fn lib(name: &str, version: &str, classes: Vec<ClassInfo>) -> LibProfile {
        LibProfile::create(
            &ClassHierarchy::new(classes),
            LibraryDescription::new(name, LibraryCategory::Utilities).with_version(version),
            Verboseness::Normal,
        )
        .unwrap()
    }

    fn app(classes: Vec<ClassInfo>) -> Arc<AppProfile> {
        Arc::new(AppProfile::create(&ClassHierarchy::new(classes), Verboseness::Normal))
    }

    #[tokio::test]
    async fn test_identify_keeps_catalog_order() {
        let catalog = LibraryCatalog::from_profiles(vec![
            lib("zeta", "1.0", vec![class("org.zeta.Z", "I")]),
            lib("alpha", "1.0", vec![class("org.alpha.A", "J")]),
        ]);
        let app = app(vec![class("org.alpha.A", "J"), class("com.app.Main", "Z")]);

        let report = identify_libraries(app, &catalog, &IdentifyOptions::default())
            .await
            .unwrap();
        let names: Vec<&str> = report
            .matches()
            .iter()
            .map(|m| m.lib().description.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(report.matches()[0].classification(), MatchLevel::AllConfigs);
        assert!(report.matches()[0].lib_root_package_present);
        assert_eq!(report.matches()[1].classification(), MatchLevel::None);
        assert!(!report.matches()[1].lib_root_package_present);
    }

    #[tokio::test]
    async fn test_identify_flags_deprecated_versions() {
        let classes = vec![class("org.alpha.A", "J")];
        let catalog = LibraryCatalog::from_profiles(vec![
            lib("alpha", "1.2", classes.clone()),
            lib("alpha", "1.10", classes.clone()),
        ]);
        let report = identify_libraries(app(classes), &catalog, &IdentifyOptions::default())
            .await
            .unwrap();
        assert!(report.matches()[0].is_deprecated);
        assert!(!report.matches()[1].is_deprecated);
    }

    #[tokio::test]
    async fn test_identify_rejects_empty_app() {
        let catalog = LibraryCatalog::from_profiles(vec![lib("alpha", "1.0", vec![class("org.alpha.A", "J")])]);
        let err = identify_libraries(app(Vec::new()), &catalog, &IdentifyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::EmptyHashTree(_)));
    }

    #[tokio::test]
    async fn test_expired_deadline_times_out_every_library() {
        let catalog = LibraryCatalog::from_profiles(vec![lib("alpha", "1.0", vec![class("org.alpha.A", "J")])]);
        let options = IdentifyOptions::default().with_deadline(Duration::ZERO);
        let report = identify_libraries(app(vec![class("org.alpha.A", "J")]), &catalog, &options)
            .await
            .unwrap();
        let m = &report.matches()[0];
        assert!(m.timed_out);
        assert_eq!(m.classification(), MatchLevel::None);
        assert!(m.results().iter().all(|r| r.score == SimScore::NoMatch));
    }

    #[test]
    fn test_scan_skips_ambiguous_root_packages() {
        let catalog = LibraryCatalog::from_profiles(vec![
            lib("gms", "1.0", vec![class("com.google.android.gms.Api", "I")]),
            lib("alpha", "1.0", vec![class("org.alpha.A", "J")]),
        ]);
        let app = app(vec![
            class("com.google.android.gms.Api", "I"),
            class("org.alpha.A", "J"),
        ]);
        let present = scan_root_packages(&app, &catalog, &IdentifyOptions::default());
        // alpha sorts first
        assert_eq!(present.into_iter().collect::<Vec<_>>(), vec![0]);
    }
}
