//! Integration tests for library fingerprinting and identification

mod cli_parsing;
mod cli_workflow;
mod common;
mod identification;
mod persistence;
mod properties;
mod scenarios;
