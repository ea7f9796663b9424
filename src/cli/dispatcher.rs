// src/cli/dispatcher.rs

use anyhow::Result;

use crate::cli::handlers::{self, commons::CommandContext};

/// A system command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &CommandContext) -> Result<()>,
}

/// The single source of truth for all system commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "build",
        aliases: &["b"],
        handler: handlers::build::handle,
    },
    CommandDefinition {
        name: "doctor",
        aliases: &[],
        handler: handlers::doctor::handle,
    },
    CommandDefinition {
        name: "expand",
        aliases: &[],
        handler: handlers::expand::handle,
    },
    CommandDefinition {
        name: "init",
        aliases: &["new"],
        handler: handlers::init::handle,
    },
    CommandDefinition {
        name: "status",
        aliases: &[],
        handler: handlers::status::handle,
    },
    CommandDefinition {
        name: "targets",
        aliases: &["ls"],
        handler: handlers::targets::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Splits the words after the global flags into a command and its arguments.
///
/// `krill <command> [args...]` runs a system command; any other first word is a
/// target name, so `krill <target> [args...]` is `krill build <target> [args...]`.
/// Returns `None` when there are no words at all.
fn route(all_args: &[String]) -> Option<(&'static CommandDefinition, Vec<String>)> {
    let (first, rest) = all_args.split_first()?;

    match find_command(first) {
        Some(command) => Some((command, rest.to_vec())),
        None => {
            let build = find_command("build")?;
            Some((build, all_args.to_vec()))
        }
    }
}

/// Runs the command named by `all_args`, or prints usage when there is none.
pub fn dispatch(all_args: Vec<String>, ctx: &CommandContext) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    match route(&all_args) {
        Some((command, handler_args)) => {
            log::debug!("Routing to '{}' with {:?}", command.name, handler_args);
            (command.handler)(handler_args, ctx)
        }
        None => {
            println!("{}", t!("cli.info.no_command"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_route_system_commands_and_aliases() {
        let (cmd, args) = route(&words(&["build", "release"])).unwrap();
        assert_eq!(cmd.name, "build");
        assert_eq!(args, vec!["release"]);

        let (cmd, args) = route(&words(&["ls"])).unwrap();
        assert_eq!(cmd.name, "targets");
        assert!(args.is_empty());

        let (cmd, args) = route(&words(&["doctor", "--fix"])).unwrap();
        assert_eq!(cmd.name, "doctor");
        assert_eq!(args, vec!["--fix"]);

        let (cmd, args) = route(&words(&["status"])).unwrap();
        assert_eq!(cmd.name, "status");
        assert!(args.is_empty());
    }

    #[test]
    fn test_unknown_word_is_a_target_shortcut() {
        let (cmd, args) = route(&words(&["release"])).unwrap();
        assert_eq!(cmd.name, "build");
        assert_eq!(args, vec!["release"]);
    }

    #[test]
    fn test_no_words() {
        assert!(route(&[]).is_none());
    }

    #[test]
    fn test_registry_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for cmd in COMMAND_REGISTRY {
            assert!(seen.insert(cmd.name));
            for alias in cmd.aliases {
                assert!(seen.insert(alias));
            }
        }
    }
}
