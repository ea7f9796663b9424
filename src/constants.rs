// src/constants.rs

/// The name of the project configuration file, at the project root.
pub const PROJECT_CONFIG_FILENAME: &str = "krill.toml";

/// Version-control ignore marker created inside every output directory.
pub const IGNORE_MARKER_FILENAME: &str = ".gitignore";

/// Content written to a freshly created ignore marker.
pub const IGNORE_MARKER_CONTENT: &str = "*";

/// Directories never searched for nested projects or source files.
pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    "includes",
    "target",
    "bin",
    "build",
    "cmake-build-debug",
    "cmake-build-release",
    "meson-build-debug",
    "meson-build-release",
];

/// Target built by `krill build` when no name is given, if it exists.
pub const DEFAULT_TARGET: &str = "default";

/// Fallback for `krill build` without a name when there is no `default` target.
pub const FALLBACK_TARGET: &str = "debug";
