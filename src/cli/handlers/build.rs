// src/cli/handlers/build.rs

use crate::{
    cli::{args::BuildArgs, handlers::commons::{self, CommandContext}},
    core::{
        environment::EnvironmentProvider,
        resolver::{ResolutionContext, TargetResolver},
    },
};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;

/// The main handler for the `build` command (and the `krill <target>` shortcut).
pub fn handle(args: Vec<String>, ctx: &CommandContext) -> Result<()> {
    let build_args = BuildArgs::try_parse_from(&args)?;
    let mut config = ctx.load_config()?;

    let target = match build_args.target {
        Some(target) => target,
        None => commons::default_target_name(&config)?.to_string(),
    };
    log::info!("Building '{}' in '{}'", target, ctx.working_dir.display());

    let mut resolver =
        TargetResolver::new(&ctx.store, &ctx.prompt, EnvironmentProvider::for_current_host());
    resolver
        .resolve(
            &mut config,
            &ctx.working_dir,
            &target,
            &mut ResolutionContext::new(),
        )
        .with_context(|| format!(t!("build.error.failed"), target = target))?;

    println!(
        "\n{}",
        format!(t!("build.success.finished"), target = target.bold()).green()
    );
    Ok(())
}
