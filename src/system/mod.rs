//! # System Interaction Layer
//!
//! Boundary between the build engine and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: spawns external processes synchronously, either through a
//!   shell environment (target commands) or directly with captured output
//!   (toolchain probes).
//! - **`shell`**: knows how each interpreter family (PowerShell, `cmd.exe`,
//!   POSIX shells) expects to receive a command line.

pub mod executor;
pub mod shell;
