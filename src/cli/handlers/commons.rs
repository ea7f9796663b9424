// src/cli/handlers/commons.rs

// Shared pieces of the command handlers.

use crate::{
    constants::{DEFAULT_TARGET, FALLBACK_TARGET},
    core::{
        config_loader::{ConfigStore, FsConfigStore},
        prompt::TerminalPrompt,
        resolver,
    },
    models::{BuildTarget, ProjectConfig, Tool},
};
use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::PathBuf;

/// What every handler runs against: the project directory, the store and the prompt.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub working_dir: PathBuf,
    pub os: String,
    pub store: FsConfigStore,
    pub prompt: TerminalPrompt,
}

impl CommandContext {
    pub fn new(working_dir: PathBuf, os: &str, assume: Option<bool>) -> Self {
        Self {
            working_dir,
            os: os.to_string(),
            store: FsConfigStore::new(os),
            prompt: TerminalPrompt::new(assume),
        }
    }

    /// Context for the current directory on the current host.
    pub fn from_current_dir(assume: Option<bool>) -> Result<Self> {
        let working_dir = env::current_dir().context(t!("common.error.current_dir"))?;
        Ok(Self::new(working_dir, env::consts::OS, assume))
    }

    /// Loads the project's `krill.toml` with placeholders expanded.
    pub fn load_config(&self) -> Result<ProjectConfig> {
        self.store
            .load(&self.working_dir)
            .context(t!("common.error.no_project"))
    }

    /// Loads the project's `krill.toml` exactly as written.
    pub fn load_raw_config(&self) -> Result<ProjectConfig> {
        self.store
            .load_raw(&self.working_dir)
            .context(t!("common.error.no_project"))
    }
}

/// How a target behaves when built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Groups dependencies and delegates into nested projects.
    Aggregate,
    /// A synthesized `<debug|release>-<tool>` target; never delegates.
    ToolSpecific,
    /// Runs its own commands.
    Command,
}

impl TargetKind {
    pub fn of(name: &str, target: &BuildTarget, tools: &[Tool]) -> Self {
        if resolver::is_tool_specific(name, tools) {
            TargetKind::ToolSpecific
        } else if target.is_aggregate() {
            TargetKind::Aggregate
        } else {
            TargetKind::Command
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TargetKind::Aggregate => t!("targets.kind.aggregate"),
            TargetKind::ToolSpecific => t!("targets.kind.tool_specific"),
            TargetKind::Command => t!("targets.kind.command"),
        }
    }
}

/// The target `krill build` runs when none is named: `default`, else `debug`.
pub fn default_target_name(config: &ProjectConfig) -> Result<&'static str> {
    [DEFAULT_TARGET, FALLBACK_TARGET]
        .into_iter()
        .find(|name| config.targets.contains_key(*name))
        .ok_or_else(|| {
            let available = config.targets.keys().cloned().collect::<Vec<_>>();
            if available.is_empty() {
                anyhow!(t!("build.error.no_targets"))
            } else {
                anyhow!(t!("build.error.no_default_target"), targets = available.join(", "))
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(names: &[&str]) -> ProjectConfig {
        let mut config = ProjectConfig::default();
        for name in names {
            config.targets.insert(
                name.to_string(),
                BuildTarget {
                    commands: vec!["true".to_string()],
                    ..Default::default()
                },
            );
        }
        config
    }

    #[test]
    fn test_default_target_name() {
        assert_eq!(default_target_name(&config_with(&["debug", "default"])).unwrap(), "default");
        assert_eq!(default_target_name(&config_with(&["debug", "release"])).unwrap(), "debug");

        let err = default_target_name(&config_with(&["release", "test"])).unwrap_err();
        assert!(err.to_string().contains("release, test"));
        assert!(default_target_name(&config_with(&[])).is_err());
    }

    #[test]
    fn test_target_kind() {
        let aggregate = BuildTarget {
            depends_on: vec!["x".to_string()],
            ..Default::default()
        };
        let command = BuildTarget {
            commands: vec!["make".to_string()],
            ..Default::default()
        };
        let tools = [Tool::CMake];

        assert_eq!(TargetKind::of("all", &aggregate, &tools), TargetKind::Aggregate);
        assert_eq!(TargetKind::of("debug-cmake", &aggregate, &tools), TargetKind::ToolSpecific);
        assert_eq!(TargetKind::of("debug", &command, &tools), TargetKind::Command);
    }
}
