// src/cli/handlers/expand.rs

use crate::cli::{args::ExpandArgs, handlers::commons::CommandContext};
use anyhow::{Context, Result};
use clap::Parser;

/// The main handler for the `expand` command.
/// Prints the configuration the build actually sees, placeholders resolved.
pub fn handle(args: Vec<String>, ctx: &CommandContext) -> Result<()> {
    let _expand_args = ExpandArgs::try_parse_from(&args)?;
    let config = ctx.load_config()?;

    let rendered = toml::to_string_pretty(&config).context(t!("expand.error.serialize"))?;
    print!("{}", rendered);
    Ok(())
}
