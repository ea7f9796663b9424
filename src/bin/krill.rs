// src/bin/krill.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use krill::cli::{Cli, dispatcher, handlers::commons::CommandContext};

/// The main entry point of the `krill` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // `{:#}` prints the whole cause chain on one line.
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);
    let ctx = CommandContext::from_current_dir(cli.assumed_answer())?;
    dispatcher::dispatch(cli.args, &ctx)
}
