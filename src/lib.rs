//! krill: a language-agnostic project manager.
//!
//! The library resolves the build targets declared in `krill.toml`, walks their
//! dependencies (including nested sub-projects) and runs every command through
//! the shell environment of the host OS.
include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
