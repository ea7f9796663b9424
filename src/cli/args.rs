// src/cli/args.rs

//! Per-command arguments. Each handler parses the words the dispatcher hands
//! it, so none of these structs expects a binary name.

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Builds a target and everything it depends on."
)]
pub struct BuildArgs {
    /// The target to build. Defaults to `default`, then `debug`.
    pub target: Option<String>,
}

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Creates krill.toml for the project in the current directory."
)]
pub struct InitArgs {
    /// The project name. Defaults to the directory name.
    #[arg(long)]
    pub name: Option<String>,

    /// The project version.
    #[arg(long)]
    pub version: Option<String>,

    /// Overwrite an existing krill.toml without asking.
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists the targets of the current project.")]
pub struct TargetsArgs {}

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Prints krill.toml with every placeholder expanded."
)]
pub struct ExpandArgs {}

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Checks krill.toml against the project on disk."
)]
pub struct DoctorArgs {
    /// Rewrite krill.toml so it matches the project on disk.
    #[arg(long)]
    pub fix: bool,

    /// Show the lines `--fix` would remove and add.
    #[arg(long)]
    pub diff: bool,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Shows the name and version of the current project.")]
pub struct StatusArgs {}
