// src/cli/handlers/mod.rs

// One module per system command, plus the helpers they share.

pub mod build;
pub mod commons;
pub mod doctor;
pub mod expand;
pub mod init;
pub mod status;
pub mod targets;
