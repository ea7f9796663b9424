// src/cli/handlers/status.rs

use crate::{
    cli::{args::StatusArgs, handlers::commons::CommandContext},
    core::config_loader::FsConfigStore,
    models::ProjectConfig,
};
use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::Path;

/// The main handler for the `status` command.
pub fn handle(args: Vec<String>, ctx: &CommandContext) -> Result<()> {
    let _status_args = StatusArgs::try_parse_from(&args)?;

    let config = if FsConfigStore::exists(&ctx.working_dir) {
        Some(ctx.load_raw_config()?)
    } else {
        None
    };

    for line in render_status(config.as_ref(), &ctx.working_dir) {
        println!("{}", line);
    }
    Ok(())
}

/// Project name and version, then whether `krill.toml` is present.
fn render_status(config: Option<&ProjectConfig>, dir: &Path) -> Vec<String> {
    let dir_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some(config) = config else {
        return vec![
            dir_name.bold().to_string(),
            t!("status.warning.no_config").yellow().to_string(),
        ];
    };

    let name = if config.project.name.is_empty() {
        dir_name
    } else {
        config.project.name.clone()
    };
    let mut heading = name.bold().to_string();
    if !config.project.version.is_empty() {
        heading.push_str(&format!(" v{}", config.project.version));
    }

    vec![heading, t!("status.info.configured").green().to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PROJECT_CONFIG_FILENAME;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_status_of_configured_project() {
        colored::control::set_override(false);
        let config: ProjectConfig =
            toml::from_str("[project]\nname = \"app\"\nversion = \"1.4.0\"\n").unwrap();

        let lines = render_status(Some(&config), Path::new("/work/checkout"));
        assert_eq!(lines, vec!["app v1.4.0", t!("status.info.configured")]);
    }

    #[test]
    fn test_status_falls_back_to_directory_name() {
        colored::control::set_override(false);
        let config = ProjectConfig::default();
        let lines = render_status(Some(&config), Path::new("/work/checkout"));
        assert_eq!(lines[0], "checkout");

        let lines = render_status(None, Path::new("/work/checkout"));
        assert_eq!(lines, vec!["checkout", t!("status.warning.no_config")]);
    }

    #[test]
    fn test_status_handler_reads_raw_config() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(PROJECT_CONFIG_FILENAME),
            "[project]\nname = \"{{ .missing }}\"\n",
        )
        .unwrap();

        let ctx = CommandContext::new(dir.path().to_path_buf(), "linux", None);
        handle(vec![], &ctx).unwrap();
        assert!(handle(vec!["--verbose".to_string()], &ctx).is_err());
    }
}
