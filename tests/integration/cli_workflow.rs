//! Profile, match and inspect through the CLI command handlers

use libsift::config::LibSiftConfig;
use libsift::tooling::cli::{CliContext, Commands};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PICASSO_CLASSES: &str = r#"{"classes": [
    {"name": "com.squareup.picasso.Picasso", "methods": [
        {"name": "load", "access": "public", "params": ["Ljava/lang/String;"], "return_type": "Lcom/squareup/picasso/RequestCreator;"},
        {"name": "with", "access": "public", "is_static": true, "params": ["Landroid/content/Context;"], "return_type": "Lcom/squareup/picasso/Picasso;"}
    ]},
    {"name": "com.squareup.picasso.RequestCreator", "methods": [
        {"name": "into", "access": "public", "params": ["Landroid/widget/ImageView;"], "return_type": "V"}
    ]}
]}"#;

// Picasso renamed to a.b, plus the app's own code
const APP_CLASSES: &str = r#"{"package_name": "de.example.app", "classes": [
    {"name": "a.b.a", "methods": [
        {"name": "a", "access": "public", "params": ["Ljava/lang/String;"], "return_type": "La/b/b;"},
        {"name": "b", "access": "public", "is_static": true, "params": ["Landroid/content/Context;"], "return_type": "La/b/a;"}
    ]},
    {"name": "a.b.b", "methods": [
        {"name": "a", "access": "public", "params": ["Landroid/widget/ImageView;"], "return_type": "V"}
    ]},
    {"name": "de.example.app.Main", "methods": [
        {"name": "onCreate", "access": "public", "params": ["Landroid/os/Bundle;"], "return_type": "V"}
    ]}
]}"#;

struct Workspace {
    dir: TempDir,
    context: CliContext,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = LibSiftConfig::default();
        config.profiles_dir = dir.path().join("profiles");
        let context = CliContext::with_config(config);
        Self { dir, context }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn profiles(&self) -> &Path {
        &self.context.config().profiles_dir
    }

    fn profile_picasso(&self) -> String {
        let classes = self.write("picasso.json", PICASSO_CLASSES);
        let description = self.write(
            "picasso.toml",
            "name = \"Picasso\"\ncategory = \"Utilities\"\nversion = \"2.5.2\"\n",
        );
        self.context
            .execute(&Commands::Profile {
                classes,
                description,
                verbose_profile: false,
            })
            .unwrap()
    }

    fn run_match(&self, json: Option<PathBuf>) -> String {
        let classes = self.write("app.json", APP_CLASSES);
        self.context
            .execute(&Commands::Match {
                classes,
                app_package: None,
                json,
                no_partial_matching: false,
                timeout: None,
            })
            .unwrap()
    }
}

#[test]
fn profile_match_and_inspect() {
    let ws = Workspace::new();

    let out = ws.profile_picasso();
    assert!(out.contains("Picasso (2.5.2)"), "{}", out);
    let stored = ws.profiles().join("Utilities").join("Picasso_2.5.2.libv");
    assert!(stored.is_file(), "{}", out);

    let report = ws.dir.path().join("report.json");
    let out = ws.run_match(Some(report.clone()));
    assert!(out.contains("Picasso"), "{}", out);
    assert!(out.contains("2.5.2"), "{}", out);
    assert!(out.contains("App package: de.example.app"), "{}", out);
    assert!(out.contains("Libraries checked: 1"), "{}", out);
    assert!(out.contains("obfuscated"), "{}", out);
    assert!(!out.contains("No library found"), "{}", out);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["app_package"], "de.example.app");
    assert_eq!(json["counts"]["all_configs"], 1);
    assert_eq!(json["counts"]["none"], 0);
    let library = &json["libraries"][0];
    assert_eq!(library["name"], "Picasso");
    assert_eq!(library["version"], "2.5.2");
    assert_eq!(library["classification"], "all_configs");
    assert_eq!(library["obfuscated"], true);

    let out = ws
        .context
        .execute(&Commands::Inspect {
            profile: stored,
            packages: true,
        })
        .unwrap();
    assert!(out.contains("Picasso"), "{}", out);
    assert!(out.contains("Root package: com.squareup.picasso"), "{}", out);
    assert!(out.contains("Package tree"), "{}", out);
}

#[test]
fn match_reports_unreadable_profiles() {
    let ws = Workspace::new();
    ws.profile_picasso();
    std::fs::write(ws.profiles().join("broken.libv"), b"not a profile").unwrap();

    let out = ws.run_match(None);
    assert!(out.contains("Picasso"), "{}", out);
    assert!(out.contains("1 unreadable profiles skipped"), "{}", out);
}

#[test]
fn inspect_missing_profile_fails() {
    let ws = Workspace::new();
    let result = ws.context.execute(&Commands::Inspect {
        profile: ws.profiles().join("absent.libv"),
        packages: false,
    });
    assert!(result.is_err());
}
