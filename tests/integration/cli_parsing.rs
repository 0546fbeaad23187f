//! Command line parsing

use clap::{CommandFactory, Parser};
use libsift::tooling::cli::Cli;

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["libsift", "profile", "--classes", "lib.json", "--description", "lib.toml"],
        vec![
            "libsift",
            "profile",
            "--classes",
            "lib.json",
            "--description",
            "lib.toml",
            "--verbose-profile",
        ],
        vec!["libsift", "match", "--classes", "app.json"],
        vec![
            "libsift",
            "match",
            "--classes",
            "app.json",
            "--app-package",
            "com.example",
            "--json",
            "out.json",
            "--no-partial-matching",
            "--timeout",
            "30",
        ],
        vec!["libsift", "inspect", "Utilities/gson_2.8.0.libv", "--packages"],
        vec!["libsift", "--config", "c.toml", "--log-format", "json", "inspect", "x.libv"],
        vec!["libsift", "inspect", "x.libv", "--profiles-dir", "/srv/p", "--log-output", "both"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_commands() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["libsift"],
        vec!["libsift", "match"],
        vec!["libsift", "inspect"],
        vec!["libsift", "match", "--classes", "app.json", "--timeout", "soon"],
        vec!["libsift", "scan"],
    ];
    for args in cases {
        assert!(
            Cli::try_parse_from(args.clone()).is_err(),
            "expected parse failure for args: {args:?}"
        );
    }
}
