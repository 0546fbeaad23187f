//! Concurrent identification over a catalog

use super::common::{app, app_code, class, library, scenario_classes};
use libsift::identify::{identify_libraries, IdentifyOptions};
use libsift::profile::MatchLevel;
use libsift::store::LibraryCatalog;
use std::sync::Arc;

#[tokio::test]
async fn identifies_contained_libraries() {
    let catalog = LibraryCatalog::from_profiles(vec![
        library("foo", "1.0", scenario_classes("com.foo")),
        library(
            "bar",
            "3.1",
            vec![
                class("org.bar.Parser", &[&["[D"], &["[D", "I"]]),
                class("org.bar.Token", &[&["C", "C"]]),
            ],
        ),
        library("foo", "0.9", scenario_classes("com.foo")),
    ]);
    let mut classes = scenario_classes("com.foo");
    classes.extend(app_code());
    let app = Arc::new(app(classes));

    let report = identify_libraries(app, &catalog, &IdentifyOptions::default())
        .await
        .unwrap();

    let found: Vec<(String, MatchLevel, bool)> = report
        .matches()
        .iter()
        .map(|m| {
            (
                m.lib().description.to_string(),
                m.classification(),
                m.is_deprecated,
            )
        })
        .collect();
    assert_eq!(
        found,
        vec![
            ("bar (3.1)".to_string(), MatchLevel::None, false),
            ("foo (0.9)".to_string(), MatchLevel::AllConfigs, true),
            ("foo (1.0)".to_string(), MatchLevel::AllConfigs, false),
        ]
    );
    assert_eq!(report.counts().all_configs, 2);
    assert_eq!(report.counts().none, 1);
    assert!(report.matches()[2].lib_root_package_present);

    let json = report.to_json();
    assert_eq!(json.libraries.len(), 3);
    assert!(report.render_text().contains("outdated"));
}
