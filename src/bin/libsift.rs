//! libsift CLI Binary
//!
//! Command-line interface for profiling libraries and detecting them in applications.

use anyhow::Context;
use clap::Parser;
use libsift::logging::init_logging;
use libsift::tooling::cli::{Cli, CliContext};
use std::process;

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = CliContext::new(cli).context("Error loading configuration")?;
    init_logging(Some(&context.config().logging)).context("Error initializing logging")?;
    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
