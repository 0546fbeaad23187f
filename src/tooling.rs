//! Tooling & Integration Layer
//!
//! Command-line front end over profiling, the profile store and library
//! identification.

pub mod cli;

pub use cli::{format_profile_text, Cli, CliContext, Commands};
