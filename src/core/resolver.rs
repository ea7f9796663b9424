// src/core/resolver.rs

//! # Target Graph Resolver
//!
//! Builds a target by walking its dependency graph depth-first: dependencies
//! in declared order, then nested sub-projects (for aggregate targets), then
//! the target's own output directory and commands. Everything runs
//! sequentially, and the first failure aborts the whole build.
//!
//! A single [`ResolutionContext`] is threaded through the entire call tree,
//! including delegation into sub-projects, so a `(directory, target)` pair is
//! visited at most once per invocation.

use crate::constants::{IGNORE_MARKER_CONTENT, IGNORE_MARKER_FILENAME};
use crate::core::config_loader::{ConfigError, ConfigStore};
use crate::core::environment::{EnvironmentError, EnvironmentProvider};
use crate::core::prompt::{ConfirmPrompt, PromptError};
use crate::models::{Environment, ProjectConfig, Tool};
use crate::system::executor::{self, ExecutionError};
use colored::Colorize;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a target could not be built.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The target name is not defined in the project at `directory`.
    #[error("Target '{target}' does not exist in '{directory}'.")]
    NotFound { target: String, directory: String },
    /// The `(directory, target)` pair was already entered during this build.
    #[error("Cycle detected at '{directory}' for target '{target}'.")]
    Cycle { directory: String, target: String },
    /// A declared dependency failed; `source` holds its own error.
    #[error("Dependency '{dependency}' failed")]
    DependencyFailed {
        dependency: String,
        #[source]
        source: Box<ResolveError>,
    },
    /// A command could not be spawned or exited unsuccessfully.
    #[error("Command '{command}' failed")]
    CommandFailed {
        command: String,
        #[source]
        source: ExecutionError,
    },
    /// The output directory or its ignore marker could not be written.
    #[error("Could not prepare output directory '{path}'")]
    OutputDir {
        path: String,
        #[source]
        source: io::Error,
    },
    /// A nested project's `krill.toml` is missing or invalid.
    #[error("Failed to load nested project at '{path}'")]
    NestedLoad {
        path: String,
        #[source]
        source: ConfigError,
    },
    /// Building inside a nested project failed.
    #[error("Failed building nested project '{path}'")]
    NestedFailed {
        path: String,
        #[source]
        source: Box<ResolveError>,
    },
    /// No `[env.<os>]` entry and discovery failed.
    #[error("Could not discover an execution environment")]
    EnvironmentDiscovery(#[from] EnvironmentError),
    /// The save-environment question could not be asked.
    #[error("Could not ask whether to save the detected environment")]
    Prompt(#[from] PromptError),
    /// The operator agreed to save the environment, but writing failed.
    #[error("Could not save the detected environment")]
    Persist(#[source] ConfigError),
}

impl ResolveError {
    /// The innermost error, looking through dependency and nested-project wrappers.
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::DependencyFailed { source, .. } | Self::NestedFailed { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}

/// Whether `name` is a tool-qualified default target (`debug-cmake`,
/// `release-cargo`) for one of the project's `tools`.
///
/// Such targets look like aggregates when synthesized in multi-tool mode, but
/// must never delegate to nested projects.
pub fn is_tool_specific(name: &str, tools: &[Tool]) -> bool {
    let Some((base, suffix)) = name.split_once('-') else {
        return false;
    };
    matches!(base, "debug" | "release")
        && tools.iter().any(|tool| tool.id().eq_ignore_ascii_case(suffix))
}

/// The `(directory, target)` pairs already entered during one top-level build.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    visited: HashSet<(PathBuf, String)>,
}

impl ResolutionContext {
    /// An empty context, one per top-level build.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the pair, returning `false` if it was already visited.
    fn enter(&mut self, working_root: &Path, target: &str) -> bool {
        let directory =
            dunce::canonicalize(working_root).unwrap_or_else(|_| working_root.to_path_buf());
        self.visited.insert((directory, target.to_string()))
    }
}

/// Runs targets, delegating into nested projects through the config store.
pub struct TargetResolver<'a> {
    store: &'a dyn ConfigStore,
    prompt: &'a dyn ConfirmPrompt,
    environments: EnvironmentProvider,
}

impl std::fmt::Debug for TargetResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetResolver")
            .field("environments", &self.environments)
            .finish_non_exhaustive()
    }
}

impl<'a> TargetResolver<'a> {
    /// `environments` is consulted only for projects without an `[env.<os>]` entry.
    pub fn new(
        store: &'a dyn ConfigStore,
        prompt: &'a dyn ConfirmPrompt,
        environments: EnvironmentProvider,
    ) -> Self {
        Self {
            store,
            prompt,
            environments,
        }
    }

    /// Builds `target_name` of `config`, whose project lives in `working_root`.
    ///
    /// A lazily discovered environment is stored in `config` for the rest of the
    /// build and, if the operator agrees, written to the project's `krill.toml`.
    pub fn resolve(
        &mut self,
        config: &mut ProjectConfig,
        working_root: &Path,
        target_name: &str,
        ctx: &mut ResolutionContext,
    ) -> Result<(), ResolveError> {
        let target = config
            .targets
            .get(target_name)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound {
                target: target_name.to_string(),
                directory: working_root.display().to_string(),
            })?;

        if !ctx.enter(working_root, target_name) {
            return Err(ResolveError::Cycle {
                directory: working_root.display().to_string(),
                target: target_name.to_string(),
            });
        }
        log::debug!("Resolving '{}' in '{}'", target_name, working_root.display());

        for dependency in &target.depends_on {
            self.resolve(config, working_root, dependency, ctx)
                .map_err(|e| ResolveError::DependencyFailed {
                    dependency: dependency.clone(),
                    source: Box::new(e),
                })?;
        }

        if target.is_aggregate() && !is_tool_specific(target_name, &config.project.tools) {
            self.delegate_to_nested(config, working_root, target_name, ctx)?;
        }

        if let Some(output_dir) = target.output_dir() {
            prepare_output_dir(working_root, output_dir)?;
        }

        let mut discovered = None;
        for command in &target.commands {
            println!("{}", format!(t!("build.info.running"), command = command).cyan());

            let environment = self.ensure_environment(config, &mut discovered)?;
            executor::execute_command(command, &environment, working_root).map_err(|e| {
                ResolveError::CommandFailed {
                    command: command.clone(),
                    source: e,
                }
            })?;
        }

        if let Some(environment) = discovered {
            self.offer_to_persist(working_root, &environment)?;
        }
        Ok(())
    }

    fn delegate_to_nested(
        &mut self,
        config: &ProjectConfig,
        working_root: &Path,
        target_name: &str,
        ctx: &mut ResolutionContext,
    ) -> Result<(), ResolveError> {
        for (path, nested) in &config.nested {
            let sub_root = working_root.join(path);
            let mut sub_config =
                self.store
                    .load(&sub_root)
                    .map_err(|e| ResolveError::NestedLoad {
                        path: path.clone(),
                        source: e,
                    })?;

            let sub_target = nested.target_for(target_name);
            log::debug!("Delegating '{}' to '{}' in '{}'", target_name, sub_target, path);
            self.resolve(&mut sub_config, &sub_root, sub_target, ctx)
                .map_err(|e| ResolveError::NestedFailed {
                    path: path.clone(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }

    /// The configured environment for the host OS, discovering one if missing.
    fn ensure_environment(
        &mut self,
        config: &mut ProjectConfig,
        discovered: &mut Option<Environment>,
    ) -> Result<Environment, ResolveError> {
        let os = self.environments.host().os.clone();
        if let Some(environment) = config.environment_for(&os) {
            return Ok(environment.clone());
        }

        let environment = self
            .environments
            .discover(config.requires_native_toolchain())?;
        config.env.insert(os, environment.clone());
        *discovered = Some(environment.clone());
        Ok(environment)
    }

    fn offer_to_persist(
        &self,
        working_root: &Path,
        environment: &Environment,
    ) -> Result<(), ResolveError> {
        let os = &self.environments.host().os;
        println!(
            "{}",
            format!(t!("build.info.env_detected"), os = os).yellow()
        );

        if self.prompt.confirm(t!("build.prompt.save_env"))? {
            self.store
                .persist_environment(working_root, os, environment)
                .map_err(ResolveError::Persist)?;
            println!("{}", format!(t!("build.success.env_saved"), os = os).green());
        }
        Ok(())
    }
}

/// Creates `working_root/output_dir` and its ignore marker. The marker is never overwritten.
fn prepare_output_dir(working_root: &Path, output_dir: &str) -> Result<(), ResolveError> {
    let path = working_root.join(output_dir);
    let output_err = |e: io::Error| ResolveError::OutputDir {
        path: path.display().to_string(),
        source: e,
    };

    fs::create_dir_all(&path).map_err(output_err)?;

    let marker = path.join(IGNORE_MARKER_FILENAME);
    match OpenOptions::new().write(true).create_new(true).open(&marker) {
        Ok(mut file) => file
            .write_all(IGNORE_MARKER_CONTENT.as_bytes())
            .map_err(output_err)?,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            log::trace!("Keeping existing '{}'", marker.display());
        }
        Err(e) => return Err(output_err(e)),
    }
    Ok(())
}
