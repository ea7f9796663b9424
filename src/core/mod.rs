// src/core/mod.rs

//! # Core Engine
//!
//! Everything between a parsed command line and a spawned process.
//!
//! - **`config_loader`**: reads and writes `krill.toml` through the [`config_loader::ConfigStore`] trait.
//! - **`templating`**: expands `{{ .path }}` placeholders in a loaded document.
//! - **`detect`**: finds build tools, languages and nested projects on disk.
//! - **`synthesizer`**: generates default targets for the detected tools.
//! - **`environment`**: decides which interpreter runs commands on this host.
//! - **`prompt`**: yes/no questions, answerable up front with `--yes`/`--no`.
//! - **`resolver`**: walks the target graph and runs every command.

pub mod config_loader;
pub mod detect;
pub mod environment;
pub mod prompt;
pub mod resolver;
pub mod synthesizer;
pub mod templating;
