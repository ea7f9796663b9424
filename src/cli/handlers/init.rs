// src/cli/handlers/init.rs

use crate::{
    cli::{args::InitArgs, handlers::commons::CommandContext},
    core::{
        config_loader::{ConfigStore, FsConfigStore},
        detect,
        environment::{EnvironmentProvider, HostPlatform},
        prompt::ConfirmPrompt,
        synthesizer,
    },
    models::{BinaryType, Project, ProjectConfig},
};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::Path;

const DEFAULT_VERSION: &str = "0.1.0";

/// The main handler for the `init` command.
pub fn handle(args: Vec<String>, ctx: &CommandContext) -> Result<()> {
    let init_args = InitArgs::try_parse_from(&args)?;

    if FsConfigStore::exists(&ctx.working_dir) && !init_args.force {
        println!("{}", t!("init.warning.already_initialized").yellow());
        if !ctx.prompt.confirm(t!("init.prompt.reinitialize"))? {
            println!("{}", t!("common.info.operation_cancelled"));
            return Ok(());
        }
    }

    let mut provider = EnvironmentProvider::new(HostPlatform {
        os: ctx.os.clone(),
        ..HostPlatform::current()
    });
    let config = build_initial_config(&ctx.working_dir, &ctx.os, &init_args, &mut provider)?;

    ctx.store
        .save(&ctx.working_dir, &config)
        .context(t!("init.error.save_failed"))?;

    println!(
        "{}",
        format!(t!("init.success.initialized"), name = config.project.name.bold()).green()
    );
    Ok(())
}

/// Detects everything `krill.toml` needs for the project in `dir`.
fn build_initial_config(
    dir: &Path,
    os: &str,
    args: &InitArgs,
    provider: &mut EnvironmentProvider,
) -> Result<ProjectConfig> {
    let name = args.name.clone().unwrap_or_else(|| {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let tools = detect::detect_tools(dir, os).context(t!("init.error.detection_failed"))?;
    let languages = detect::detect_languages(&tools);
    if languages.is_empty() && !tools.is_empty() {
        println!("{}", t!("init.warning.no_languages").yellow());
    }

    let mut config = ProjectConfig {
        project: Project {
            name,
            version: args.version.clone().unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            binary_type: BinaryType::Executable,
            languages,
            tools,
        },
        ..Default::default()
    };
    // Fails on zero tools, before anything is written.
    config.targets =
        synthesizer::synthesize(&config.project, os).context(t!("init.error.no_tools"))?;

    match provider.discover(config.requires_native_toolchain()) {
        Ok(environment) => {
            config.env.insert(provider.host().os.clone(), environment);
        }
        Err(e) => {
            // Left unset; `build` discovers it again and offers to save it.
            log::warn!("Environment discovery failed: {}", e);
            println!("{}", format!(t!("init.warning.no_environment"), error = e).yellow());
        }
    }

    config.nested =
        detect::detect_nested_projects(dir).context(t!("init.error.detection_failed"))?;

    Ok(config)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::constants::PROJECT_CONFIG_FILENAME;
    use crate::models::{Language, Tool};
    use std::fs;
    use tempfile::tempdir;

    fn provider() -> EnvironmentProvider {
        EnvironmentProvider::new(HostPlatform {
            os: "linux".to_string(),
            shell: Some("/bin/sh".to_string()),
            program_files_x86: None,
        })
    }

    #[test]
    fn test_initial_config_for_multi_tool_project() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("CMakeLists.txt"), "").unwrap();
        fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        fs::create_dir_all(dir.path().join("plugin")).unwrap();
        fs::write(dir.path().join("plugin").join(PROJECT_CONFIG_FILENAME), "").unwrap();

        let args = InitArgs {
            name: Some("app".to_string()),
            ..Default::default()
        };
        let config = build_initial_config(dir.path(), "linux", &args, &mut provider()).unwrap();

        assert_eq!(config.project.name, "app");
        assert_eq!(config.project.version, DEFAULT_VERSION);
        assert_eq!(config.project.tools, vec![Tool::CMake, Tool::Cargo]);
        assert_eq!(
            config.project.languages,
            vec![Language::C, Language::Cpp, Language::Rust]
        );
        assert_eq!(config.env["linux"].path, "/bin/sh");
        assert_eq!(
            config.targets["debug"].depends_on,
            vec!["debug-cmake", "debug-cargo"]
        );
        assert!(config.nested.contains_key("plugin"));
    }

    #[test]
    fn test_initial_config_without_tools_fails() {
        let dir = tempdir().unwrap();
        let err = build_initial_config(dir.path(), "linux", &InitArgs::default(), &mut provider())
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<synthesizer::SynthesisError>(),
            Some(&synthesizer::SynthesisError::NoTools)
        );
    }

    #[test]
    fn test_init_without_tools_writes_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "no build files here").unwrap();

        let ctx = CommandContext::new(dir.path().to_path_buf(), "linux", Some(true));
        assert!(handle(vec![], &ctx).is_err());
        assert!(!dir.path().join(PROJECT_CONFIG_FILENAME).exists());
    }

    #[test]
    fn test_reinitialize_declined_keeps_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILENAME);
        fs::write(&path, "[project]\nname = \"kept\"\n").unwrap();

        let ctx = CommandContext::new(dir.path().to_path_buf(), "linux", Some(false));
        handle(vec![], &ctx).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[project]\nname = \"kept\"\n");
    }
}
