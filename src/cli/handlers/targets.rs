// src/cli/handlers/targets.rs

use crate::{
    cli::{
        args::TargetsArgs,
        handlers::commons::{CommandContext, TargetKind},
    },
    models::ProjectConfig,
};
use anyhow::Result;
use clap::Parser;
use colored::*;

/// The main handler for the `targets` command.
pub fn handle(args: Vec<String>, ctx: &CommandContext) -> Result<()> {
    let _targets_args = TargetsArgs::try_parse_from(&args)?;
    let config = ctx.load_config()?;

    println!(
        "\n--- {} '{}' ---",
        t!("targets.header"),
        config.project.name.yellow()
    );

    if config.targets.is_empty() {
        println!("  {}", t!("targets.info.none").dimmed());
        return Ok(());
    }

    for line in render_lines(&config) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per target: name, kind, then what it runs or depends on.
fn render_lines(config: &ProjectConfig) -> Vec<String> {
    let width = config.targets.keys().map(String::len).max().unwrap_or(0);

    config
        .targets
        .iter()
        .map(|(name, target)| {
            let kind = TargetKind::of(name, target, &config.project.tools);
            let mut line = format!("  {:<width$}  {}", name.cyan(), kind.label().dimmed(), width = width);
            if !target.depends_on.is_empty() {
                line.push_str(&format!("  -> {}", target.depends_on.join(", ")));
            }
            if let Some(dir) = target.output_dir() {
                line.push_str(&format!("  [{}]", dir));
            }
            line
        })
        .collect()
}
