// src/cli/handlers/doctor.rs

use crate::{
    cli::{args::DoctorArgs, handlers::commons::CommandContext},
    core::{
        config_loader::{ConfigStore, FsConfigStore},
        detect,
        synthesizer::{self, SynthesisError},
    },
    models::{NestedProject, Project, ProjectConfig, Tool},
};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Issue {
    level: Level,
    description: String,
    /// Whether `--fix` resolves it.
    fixable: bool,
}

impl Issue {
    fn new(level: Level, description: impl Into<String>, fixable: bool) -> Self {
        Self {
            level,
            description: description.into(),
            fixable,
        }
    }
}

/// What the project directory actually contains.
#[derive(Debug, Clone, Default)]
struct Detected {
    tools: Vec<Tool>,
    nested: BTreeMap<String, NestedProject>,
}

impl Detected {
    fn scan(dir: &Path, os: &str) -> Result<Self> {
        Ok(Self {
            tools: detect::detect_tools(dir, os).context(t!("doctor.error.detection_failed"))?,
            nested: detect::detect_nested_projects(dir)
                .context(t!("doctor.error.detection_failed"))?,
        })
    }
}

/// One line of `--diff` output.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    Removed(String),
    Added(String),
}

/// The main handler for the `doctor` command.
///
/// Works on the raw `krill.toml`, so `--fix` never bakes expanded placeholders into the file.
pub fn handle(args: Vec<String>, ctx: &CommandContext) -> Result<()> {
    let doctor_args = DoctorArgs::try_parse_from(&args)?;
    let config = ctx.load_raw_config()?;

    let detected = Detected::scan(&ctx.working_dir, &ctx.os)?;
    let issues = diagnose(&config, &ctx.working_dir, &ctx.os, &detected);
    print_issues(&issues);

    if !issues.iter().any(|issue| issue.fixable) {
        return Ok(());
    }
    if !doctor_args.fix && !doctor_args.diff {
        println!("{}", t!("doctor.info.run_fix").yellow());
        return Ok(());
    }

    let fixed = fixed_config(&config, &ctx.os, &detected).context(t!("doctor.error.no_targets"))?;

    if doctor_args.diff {
        let changes = config_diff(&config, &fixed).context(t!("doctor.error.diff_failed"))?;
        print_diff(&changes);
    }

    if doctor_args.fix {
        ctx.store
            .save(&ctx.working_dir, &fixed)
            .context(t!("doctor.error.save_failed"))?;
        println!("{}", t!("doctor.success.fixed").green());
    } else {
        println!("{}", t!("doctor.info.run_fix").yellow());
    }
    Ok(())
}

fn diagnose(config: &ProjectConfig, dir: &Path, os: &str, detected: &Detected) -> Vec<Issue> {
    let mut issues = Vec::new();

    if tooling_changed(config, &detected.tools) {
        issues.push(Issue::new(
            Level::Warning,
            format!(
                t!("doctor.issue.tools_mismatch"),
                declared = join_ids(&config.project.tools),
                detected = join_ids(&detected.tools)
            ),
            true,
        ));
    } else if config.project.languages != detect::detect_languages(&config.project.tools) {
        issues.push(Issue::new(Level::Warning, t!("doctor.issue.languages_mismatch"), true));
    }

    if config.environment_for(os).is_none() {
        issues.push(Issue::new(
            Level::Info,
            format!(t!("doctor.issue.missing_environment"), os = os),
            false,
        ));
    }

    if config.targets.is_empty() {
        issues.push(Issue::new(Level::Warning, t!("doctor.issue.no_targets"), true));
    }

    for (name, target) in &config.targets {
        for dependency in &target.depends_on {
            if !config.targets.contains_key(dependency) {
                issues.push(Issue::new(
                    Level::Error,
                    format!(
                        t!("doctor.issue.unknown_dependency"),
                        target = name,
                        dependency = dependency
                    ),
                    false,
                ));
            }
        }
    }

    for path in config.nested.keys() {
        if !FsConfigStore::exists(&dir.join(path)) {
            issues.push(Issue::new(
                Level::Error,
                format!(t!("doctor.issue.nested_missing"), path = path),
                true,
            ));
        }
    }
    for path in detected.nested.keys() {
        if !config.nested.contains_key(path) {
            issues.push(Issue::new(
                Level::Warning,
                format!(t!("doctor.issue.nested_untracked"), path = path),
                true,
            ));
        }
    }

    issues.sort_by_key(|issue| issue.level);
    issues
}

/// Whether the detected tools would change the tool set or the target naming mode.
fn tooling_changed(config: &ProjectConfig, detected: &[Tool]) -> bool {
    let declared: BTreeSet<Tool> = config.project.tools.iter().copied().collect();
    let found: BTreeSet<Tool> = detected.iter().copied().collect();
    declared != found
        || synthesizer::is_multi_tool(&config.project)
            != synthesizer::is_multi_tool(&aligned_project(&config.project, detected))
}

fn aligned_project(project: &Project, tools: &[Tool]) -> Project {
    Project {
        languages: detect::detect_languages(tools),
        tools: tools.to_vec(),
        ..project.clone()
    }
}

/// The configuration `--fix` writes.
///
/// Tools and languages follow detection. When the tooling changes, or there are
/// no targets at all, the targets generated for the old tooling are replaced by
/// the ones for the new tooling; hand-written targets are kept. Nested entries
/// follow the sub-projects on disk, keeping the mappings of those still present.
fn fixed_config(
    config: &ProjectConfig,
    os: &str,
    detected: &Detected,
) -> Result<ProjectConfig, SynthesisError> {
    let mut fixed = config.clone();
    fixed.project = aligned_project(&config.project, &detected.tools);

    if tooling_changed(config, &detected.tools) || config.targets.is_empty() {
        let generated = synthesizer::synthesize(&fixed.project, os)?;
        if let Ok(previous) = synthesizer::synthesize(&config.project, os) {
            for name in previous.keys() {
                fixed.targets.remove(name);
            }
        }
        fixed.targets.extend(generated);
    }

    fixed.nested = detected
        .nested
        .iter()
        .map(|(path, found)| {
            let kept = config.nested.get(path).unwrap_or(found);
            (path.clone(), kept.clone())
        })
        .collect();

    Ok(fixed)
}

/// Lines only in `before` are removed, lines only in `after` are added.
fn config_diff(before: &ProjectConfig, after: &ProjectConfig) -> Result<Vec<Change>, toml::ser::Error> {
    let before = toml::to_string(before)?;
    let after = toml::to_string(after)?;
    let old: BTreeSet<&str> = before.lines().collect();
    let new: BTreeSet<&str> = after.lines().collect();

    let removed = before
        .lines()
        .filter(|line| !line.trim().is_empty() && !new.contains(line))
        .map(|line| Change::Removed(line.to_string()));
    let added = after
        .lines()
        .filter(|line| !line.trim().is_empty() && !old.contains(line))
        .map(|line| Change::Added(line.to_string()));
    Ok(removed.chain(added).collect())
}

fn join_ids(tools: &[Tool]) -> String {
    if tools.is_empty() {
        return "-".to_string();
    }
    tools.iter().map(|t| t.id()).collect::<Vec<_>>().join(", ")
}

fn print_issues(issues: &[Issue]) {
    println!("\n--- {} ---", t!("doctor.header").cyan());

    if issues.is_empty() {
        println!("  {}", t!("doctor.success.healthy").green());
        return;
    }

    for issue in issues {
        let symbol = match issue.level {
            Level::Error => "✗".red(),
            Level::Warning => "!".yellow(),
            Level::Info => "i".blue(),
        };
        println!("  {} {}", symbol, issue.description);
    }

    let count = |level: Level| issues.iter().filter(|i| i.level == level).count();
    println!(
        "\n{}",
        format!(
            t!("doctor.info.summary"),
            errors = count(Level::Error),
            warnings = count(Level::Warning),
            infos = count(Level::Info)
        )
        .dimmed()
    );
}

fn print_diff(changes: &[Change]) {
    println!("\n--- {} ---", t!("doctor.diff.header").cyan());
    if changes.is_empty() {
        println!("  {}", t!("doctor.diff.none").dimmed());
        return;
    }
    for change in changes {
        match change {
            Change::Removed(line) => println!("  {} {}", "-".red(), line),
            Change::Added(line) => println!("  {} {}", "+".green(), line),
        }
    }
}
