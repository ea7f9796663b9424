// src/core/detect.rs

//! Project inspection used by `krill init` and `krill doctor`: which build
//! tools a directory uses, which languages follow from them, and which
//! sub-directories are krill projects of their own.

use crate::constants::{EXCLUDED_DIRS, PROJECT_CONFIG_FILENAME};
use crate::models::{Language, NestedProject, Tool};
use glob::Pattern;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Could not list the contents of '{path}'")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not scan the project tree")]
    Walk(#[from] walkdir::Error),
}

/// File names (or glob patterns) in the project root that reveal a build tool.
fn markers(tool: Tool) -> &'static [&'static str] {
    match tool {
        Tool::CMake => &["CMakeLists.txt", "*.cmake"],
        Tool::Nob => &["nob", "nob.exe", "nob.h"],
        Tool::Gradle => &["*.gradle", "*.gradle.kts"],
        Tool::Meson => &["meson.build"],
        Tool::Cargo => &["Cargo.toml"],
        Tool::Make => &["Makefile", "makefile"],
        Tool::Taskfile => &["Taskfile.yml", "Taskfile.yaml", "taskfile.yml", "taskfile.yaml"],
        Tool::Go => &["go.mod", "go.sum", "*.go"],
        Tool::Odin => &["*.odin"],
        Tool::DotNet => &["*.sln", "*.csproj", "*.fsproj", "*.fs", "*.cs"],
        _ => &[],
    }
}

fn matches_marker(marker: &str, file_name: &str) -> bool {
    if !marker.contains('*') {
        return marker == file_name;
    }
    match Pattern::new(marker) {
        Ok(pattern) => pattern.matches(file_name),
        Err(e) => {
            log::warn!("Ignoring invalid marker pattern '{}': {}", marker, e);
            false
        }
    }
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

/// Detects the build tools used by the project rooted at `dir`.
///
/// Marker files in `dir` itself take precedence. When none is present, the
/// tree is scanned for source files and the matching raw compilers are
/// returned (the C/C++ compiler depends on `os`). The result follows the
/// declaration order of [`Tool`].
pub fn detect_tools(dir: &Path, os: &str) -> Result<Vec<Tool>, DetectError> {
    let read_err = |e: std::io::Error| DetectError::ReadDir {
        path: dir.display().to_string(),
        source: e,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    let found: Vec<Tool> = Tool::ALL
        .into_iter()
        .filter(|tool| {
            markers(*tool)
                .iter()
                .any(|marker| names.iter().any(|name| matches_marker(marker, name)))
        })
        .collect();

    if !found.is_empty() {
        log::debug!("Marker files in '{}' point to {:?}", dir.display(), found);
        return Ok(found);
    }

    let raw = detect_raw_compilers(dir, os)?;
    log::debug!("No marker files in '{}'; source scan found {:?}", dir.display(), raw);
    Ok(raw)
}

fn native_compiler(os: &str) -> Tool {
    match os {
        "windows" => Tool::Msvc,
        "macos" => Tool::Clang,
        _ => Tool::Gcc,
    }
}

fn detect_raw_compilers(dir: &Path, os: &str) -> Result<Vec<Tool>, DetectError> {
    let mut found = HashSet::new();

    for entry in WalkDir::new(dir).into_iter().filter_entry(|e| !is_excluded(e)) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let tool = match entry.path().extension().and_then(|ext| ext.to_str()) {
            Some("c" | "cpp") => native_compiler(os),
            Some("kt") => Tool::KotlinC,
            Some("java") => Tool::JavaC,
            Some("rs") => Tool::RustC,
            _ => continue,
        };
        found.insert(tool);
    }

    Ok(Tool::ALL.into_iter().filter(|t| found.contains(t)).collect())
}

/// Every language some tool in `tools` can build, in [`Language`] declaration order.
pub fn detect_languages(tools: &[Tool]) -> Vec<Language> {
    Language::ALL
        .into_iter()
        .filter(|language| tools.iter().any(|tool| tool.supports(*language)))
        .collect()
}

/// Finds every directory below `root` that holds its own `krill.toml`.
///
/// Keys are `/`-separated paths relative to `root`; mappings start empty.
pub fn detect_nested_projects(root: &Path) -> Result<BTreeMap<String, NestedProject>, DetectError> {
    let mut nested = BTreeMap::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_excluded(e));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_dir() || !entry.path().join(PROJECT_CONFIG_FILENAME).is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        log::debug!("Detected nested project at '{}'", key);
        nested.insert(key, NestedProject::default());
    }

    Ok(nested)
}
