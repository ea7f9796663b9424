// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// --- `krill.toml` MODELS ---

/// Represents the deserialized structure of a `krill.toml` file.
///
/// Nested sub-projects are loaded into this very same type, so a parent and
/// its children always share one schema.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: Project,
    /// Execution environments keyed by OS family (`windows`, `macos`, `linux`).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, Environment>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<String, BuildTarget>,
    /// Sub-projects keyed by their path relative to this project's root.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nested: BTreeMap<String, NestedProject>,
}

impl ProjectConfig {
    /// Returns the environment configured for `os`, ignoring entries without an interpreter.
    pub fn environment_for(&self, os: &str) -> Option<&Environment> {
        self.env.get(os).filter(|env| !env.path.trim().is_empty())
    }

    /// Whether commands of this project need a native C/C++ toolchain environment.
    pub fn requires_native_toolchain(&self) -> bool {
        self.project
            .languages
            .iter()
            .any(|lang| matches!(lang, Language::C | Language::Cpp))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default)]
    pub binary_type: BinaryType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<Language>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

/// The interpreter used to run target commands, plus the arguments placed before each command.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub path: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildTarget {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    /// Relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl BuildTarget {
    /// Returns the output directory, treating an empty string as absent.
    pub fn output_dir(&self) -> Option<&str> {
        self.output_dir.as_deref().filter(|dir| !dir.is_empty())
    }

    /// A pure grouping node: dependencies, but no commands and no output directory.
    pub fn is_aggregate(&self) -> bool {
        !self.depends_on.is_empty() && self.commands.is_empty() && self.output_dir().is_none()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedProject {
    /// Parent target name -> sub-project target name. Unmapped names are reused as-is.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mappings: BTreeMap<String, String>,
}

impl NestedProject {
    pub fn target_for<'a>(&'a self, parent_target: &'a str) -> &'a str {
        self.mappings
            .get(parent_target)
            .map(String::as_str)
            .unwrap_or(parent_target)
    }
}

// --- ENUMERATIONS ---

/// A build tool krill knows how to drive.
///
/// The declaration order is meaningful: detection reports tools in this order.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    CMake,
    Nob,
    Gcc,
    Msvc,
    Clang,
    Gradle,
    KotlinC,
    JavaC,
    Meson,
    Cargo,
    RustC,
    Make,
    Taskfile,
    Go,
    Odin,
    DotNet,
    Custom,
}

impl Tool {
    pub const ALL: [Tool; 17] = [
        Tool::CMake,
        Tool::Nob,
        Tool::Gcc,
        Tool::Msvc,
        Tool::Clang,
        Tool::Gradle,
        Tool::KotlinC,
        Tool::JavaC,
        Tool::Meson,
        Tool::Cargo,
        Tool::RustC,
        Tool::Make,
        Tool::Taskfile,
        Tool::Go,
        Tool::Odin,
        Tool::DotNet,
        Tool::Custom,
    ];

    /// Lower-case identifier, used in `krill.toml` and in qualified target names.
    pub fn id(self) -> &'static str {
        match self {
            Tool::CMake => "cmake",
            Tool::Nob => "nob",
            Tool::Gcc => "gcc",
            Tool::Msvc => "msvc",
            Tool::Clang => "clang",
            Tool::Gradle => "gradle",
            Tool::KotlinC => "kotlinc",
            Tool::JavaC => "javac",
            Tool::Meson => "meson",
            Tool::Cargo => "cargo",
            Tool::RustC => "rustc",
            Tool::Make => "make",
            Tool::Taskfile => "taskfile",
            Tool::Go => "go",
            Tool::Odin => "odin",
            Tool::DotNet => "dotnet",
            Tool::Custom => "custom",
        }
    }

    /// Languages this tool can build on its own.
    pub fn supported_languages(self) -> &'static [Language] {
        use Language::*;
        match self {
            Tool::CMake | Tool::Meson | Tool::Gcc | Tool::Msvc | Tool::Clang => &[C, Cpp],
            Tool::Nob => &[C],
            Tool::Gradle => &[Kotlin, Java],
            Tool::KotlinC => &[Kotlin],
            Tool::JavaC => &[Java],
            Tool::Cargo | Tool::RustC => &[Rust],
            Tool::Go => &[Go],
            Tool::Odin => &[Odin],
            Tool::DotNet => &[CSharp, FSharp],
            Tool::Make | Tool::Taskfile => &[C, Cpp, Kotlin, Java, Rust, Go, Odin, CSharp, FSharp],
            Tool::Custom => &[],
        }
    }

    pub fn supports(self, language: Language) -> bool {
        self.supported_languages().contains(&language)
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Kotlin,
    Java,
    Rust,
    Go,
    Odin,
    CSharp,
    FSharp,
    Custom,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::C,
        Language::Cpp,
        Language::Kotlin,
        Language::Java,
        Language::Rust,
        Language::Go,
        Language::Odin,
        Language::CSharp,
        Language::FSharp,
        Language::Custom,
    ];
}

/// The kind of artefact a project produces. Drives the `{{ .bin_ext }}` placeholder.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BinaryType {
    #[default]
    Executable,
    SharedLib,
    DynamicLib,
    StaticLib,
    Object,
    Framework,
}

impl BinaryType {
    /// File extension (including the dot) for this artefact on `os`.
    /// `None` means the artefact does not exist on that platform.
    pub fn extension(self, os: &str) -> Option<&'static str> {
        match (os, self) {
            ("windows", BinaryType::Executable) => Some(".exe"),
            ("windows", BinaryType::SharedLib | BinaryType::DynamicLib) => Some(".dll"),
            ("windows", BinaryType::StaticLib) => Some(".lib"),
            ("windows", BinaryType::Object) => Some(".obj"),
            ("windows", BinaryType::Framework) => None,
            ("macos", BinaryType::Executable) => Some(""),
            ("macos", BinaryType::SharedLib | BinaryType::DynamicLib) => Some(".dylib"),
            ("macos", BinaryType::StaticLib) => Some(".a"),
            ("macos", BinaryType::Object) => Some(".o"),
            ("macos", BinaryType::Framework) => Some(".framework"),
            (_, BinaryType::Executable) => Some(""),
            (_, BinaryType::SharedLib | BinaryType::DynamicLib) => Some(".so"),
            (_, BinaryType::StaticLib) => Some(".a"),
            (_, BinaryType::Object) => Some(".o"),
            (_, BinaryType::Framework) => None,
        }
    }
}
