// src/core/synthesizer.rs

//! Default build targets for the tools a project uses.
//!
//! With a single tool the targets keep their plain names (`debug`, `release`).
//! With several tools, or a tool that cannot build every project language on
//! its own, every name is qualified with the tool id (`debug-cmake`) and two
//! umbrella targets, `debug` and `release`, depend on all qualified ones.

use crate::models::{BuildTarget, Project, Tool};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("No build tools detected; cannot generate build targets.")]
    NoTools,
}

/// The build phase a default target belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Debug,
    Release,
    /// Tools without a debug/release split.
    Default,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Debug => "debug",
            Phase::Release => "release",
            Phase::Default => "default",
        }
    }
}

/// Placeholder for the output directory of the target that will be called `name`.
fn out(name: &str) -> String {
    format!("{{{{ .targets.{}.output_dir }}}}", name)
}

fn target(commands: Vec<String>, output_dir: Option<&str>) -> BuildTarget {
    BuildTarget {
        commands,
        output_dir: output_dir.map(str::to_string),
        depends_on: Vec::new(),
    }
}

/// Default target for `tool` in `phase`, or `None` when the tool has no such phase.
/// `name` is the final target name, used so placeholders point at the target itself.
fn default_target(tool: Tool, phase: Phase, name: &str, os: &str) -> Option<BuildTarget> {
    let artefact = format!("{}/{{{{ .project.name }}}}{{{{ .exe_ext }}}}", out(name));

    match (tool, phase) {
        (Tool::CMake, Phase::Debug | Phase::Release) => {
            let (build_type, dir) = match phase {
                Phase::Debug => ("Debug", "cmake-build-debug"),
                _ => ("Release", "cmake-build-release"),
            };
            Some(target(
                vec![
                    format!("cmake -S . -B {} -DCMAKE_BUILD_TYPE={}", out(name), build_type),
                    format!("cmake --build {}", out(name)),
                ],
                Some(dir),
            ))
        }
        (Tool::Gradle, Phase::Debug | Phase::Release) => Some(target(
            vec![format!("./gradlew build -PbuildType={}", phase.name())],
            Some("build"),
        )),
        (Tool::Meson, Phase::Debug | Phase::Release) => {
            let dir = match phase {
                Phase::Debug => "meson-build-debug",
                _ => "meson-build-release",
            };
            Some(target(
                vec![
                    format!("meson setup {} --buildtype={}", out(name), phase.name()),
                    format!("meson compile -C {}", out(name)),
                ],
                Some(dir),
            ))
        }
        (Tool::Cargo, Phase::Debug) => Some(target(vec!["cargo build".to_string()], Some("target/debug"))),
        (Tool::Cargo, Phase::Release) => Some(target(
            vec!["cargo build --release".to_string()],
            Some("target/release"),
        )),
        (Tool::Go, Phase::Debug) => Some(target(
            vec![format!("go build -gcflags=\"-N -l\" -o {}", artefact)],
            Some("bin/debug"),
        )),
        (Tool::Go, Phase::Release) => Some(target(
            vec![format!("go build -ldflags=\"-s -w\" -o {}", artefact)],
            Some("bin/release"),
        )),
        (Tool::Odin, Phase::Debug) => Some(target(
            vec![format!("odin build . -debug -out:{}", artefact)],
            Some("bin/debug"),
        )),
        (Tool::Odin, Phase::Release) => Some(target(
            vec![format!("odin build . -o:speed -out:{}", artefact)],
            Some("bin/release"),
        )),
        (Tool::DotNet, Phase::Debug) => Some(target(vec!["dotnet build -c Debug".to_string()], Some("bin/Debug"))),
        (Tool::DotNet, Phase::Release) => Some(target(
            vec!["dotnet build -c Release".to_string()],
            Some("bin/Release"),
        )),
        (Tool::Make, Phase::Debug | Phase::Release) => {
            Some(target(vec![format!("make {}", phase.name())], None))
        }
        (Tool::Taskfile, Phase::Debug | Phase::Release) => {
            Some(target(vec![format!("task build:{}", phase.name())], None))
        }
        (Tool::Nob, Phase::Default) => {
            let binary = if os == "windows" { "nob.exe" } else { "./nob" };
            Some(target(vec![binary.to_string()], None))
        }
        _ => None,
    }
}

fn phases_for(tool: Tool) -> &'static [Phase] {
    match tool {
        Tool::Nob => &[Phase::Default],
        _ => &[Phase::Debug, Phase::Release],
    }
}

/// Whether `project` needs tool-qualified target names.
pub fn is_multi_tool(project: &Project) -> bool {
    match project.tools.as_slice() {
        [] => false,
        [single] => !project
            .languages
            .iter()
            .all(|language| single.supports(*language)),
        _ => true,
    }
}

/// Default targets for a single tool, named as they would be in single-tool mode.
pub fn synthesize_for_tool(tool: Tool, os: &str) -> BTreeMap<String, BuildTarget> {
    phases_for(tool)
        .iter()
        .filter_map(|phase| {
            default_target(tool, *phase, phase.name(), os)
                .map(|target| (phase.name().to_string(), target))
        })
        .collect()
}

/// Generates the default target set for every tool declared by `project`.
///
/// # Errors
/// [`SynthesisError::NoTools`] when the project declares no tool.
pub fn synthesize(project: &Project, os: &str) -> Result<BTreeMap<String, BuildTarget>, SynthesisError> {
    if project.tools.is_empty() {
        return Err(SynthesisError::NoTools);
    }

    let multi = is_multi_tool(project);
    log::debug!(
        "Synthesizing targets for {:?} (multi-tool: {})",
        project.tools,
        multi
    );

    let mut targets = BTreeMap::new();
    let mut debug_deps = Vec::new();
    let mut release_deps = Vec::new();

    for tool in &project.tools {
        for phase in phases_for(*tool) {
            let name = if multi {
                format!("{}-{}", phase.name(), tool.id())
            } else {
                phase.name().to_string()
            };
            let Some(target) = default_target(*tool, *phase, &name, os) else {
                continue;
            };

            if multi {
                match phase {
                    Phase::Debug => debug_deps.push(name.clone()),
                    Phase::Release => release_deps.push(name.clone()),
                    Phase::Default => {}
                }
            }
            targets.insert(name, target);
        }
    }

    if multi {
        for (umbrella, deps) in [("debug", debug_deps), ("release", release_deps)] {
            if !deps.is_empty() {
                targets.insert(
                    umbrella.to_string(),
                    BuildTarget {
                        depends_on: deps,
                        ..Default::default()
                    },
                );
            }
        }
    }

    Ok(targets)
}
