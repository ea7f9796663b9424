// src/cli/mod.rs

//! # Command Line Surface
//!
//! `clap` only parses the global flags here. Everything after them is handed to
//! the [`dispatcher`], which picks a system command or treats the first word as
//! a target name (`krill release` is `krill build release`).

use clap::Parser;

pub mod args;
pub mod dispatcher;
pub mod handlers;

/// Renders the semantic help template (`<title>`, `<cmd>`, ...) with ANSI styles.
fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();
    let style = |code: &'static str| if use_colors { code } else { "" };

    let title = style("\x1b[1;33m");
    let cmd = style("\x1b[36m");
    let hl = style("\x1b[1;36m");
    let dim = style("\x1b[2m");
    let reset = style("\x1b[0m");

    let formatted = t!("cli.help.template")
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<hl>", hl)
        .replace("</hl>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    // Built once per process; clap needs a 'static template.
    Box::leak(formatted.into_boxed_str())
}

/// krill: drives your existing build tools from one `krill.toml`.
#[derive(Parser, Debug)]
#[command(
    name = "krill",
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Answer "yes" to every confirmation prompt.
    #[arg(long, short = 'y', conflicts_with = "no")]
    pub yes: bool,

    /// Answer "no" to every confirmation prompt.
    #[arg(long)]
    pub no: bool,

    /// The command (or target) and its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// The answer fixed by `--yes`/`--no`, if any.
    pub fn assumed_answer(&self) -> Option<bool> {
        if self.yes {
            Some(true)
        } else if self.no {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_and_trailing_args() {
        let cli = Cli::try_parse_from(["krill", "--yes", "build", "release"]).unwrap();
        assert_eq!(cli.assumed_answer(), Some(true));
        assert_eq!(cli.args, vec!["build", "release"]);

        let cli = Cli::try_parse_from(["krill", "--no", "init", "--force"]).unwrap();
        assert_eq!(cli.assumed_answer(), Some(false));
        assert_eq!(cli.args, vec!["init", "--force"]);

        let cli = Cli::try_parse_from(["krill", "release"]).unwrap();
        assert_eq!(cli.assumed_answer(), None);
    }

    #[test]
    fn test_yes_and_no_conflict() {
        assert!(Cli::try_parse_from(["krill", "--yes", "--no"]).is_err());
    }
}
