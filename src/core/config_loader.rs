// src/core/config_loader.rs

//! # Config Loader
//!
//! Reads and writes `krill.toml`. Loading runs the full sequence (read, parse,
//! expand placeholders, deserialize) for one directory, so a nested project is
//! loaded exactly like a root project and never inherits anything from its
//! parent.

use crate::constants::PROJECT_CONFIG_FILENAME;
use crate::core::templating::{self, TemplateError};
use crate::models::{Environment, ProjectConfig};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No {file} found in '{dir}'.", file = PROJECT_CONFIG_FILENAME)]
    NotFound { dir: String },
    #[error("Filesystem error on '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error parsing TOML in '{path}'")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Could not expand placeholders in '{path}'")]
    Template {
        path: String,
        #[source]
        source: TemplateError,
    },
    #[error("Failed to serialize configuration to TOML")]
    Serialize(#[from] toml::ser::Error),
    #[error("Could not replace '{path}'")]
    Persist {
        path: String,
        #[source]
        source: tempfile::PersistError,
    },
}

/// Where project configurations come from and go to.
pub trait ConfigStore {
    /// Loads the configuration of the project rooted at `dir`, with placeholders expanded.
    fn load(&self, dir: &Path) -> Result<ProjectConfig, ConfigError>;

    /// Loads the configuration as written, placeholders untouched.
    fn load_raw(&self, dir: &Path) -> Result<ProjectConfig, ConfigError>;

    /// Writes `config` as the configuration of the project rooted at `dir`.
    fn save(&self, dir: &Path, config: &ProjectConfig) -> Result<(), ConfigError>;

    /// Records `environment` as `[env.<os>]` of the project rooted at `dir`.
    ///
    /// Works on the raw file so placeholders elsewhere in it survive the rewrite.
    fn persist_environment(
        &self,
        dir: &Path,
        os: &str,
        environment: &Environment,
    ) -> Result<(), ConfigError> {
        let mut raw = self.load_raw(dir)?;
        raw.env.insert(os.to_string(), environment.clone());
        self.save(dir, &raw)
    }
}

/// `krill.toml` files on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    os: String,
}

impl FsConfigStore {
    /// A store that expands placeholders for the given OS family.
    pub fn new(os: impl Into<String>) -> Self {
        Self { os: os.into() }
    }

    pub fn for_current_host() -> Self {
        Self::new(env::consts::OS)
    }

    pub fn config_path(dir: &Path) -> PathBuf {
        dir.join(PROJECT_CONFIG_FILENAME)
    }

    pub fn exists(dir: &Path) -> bool {
        Self::config_path(dir).is_file()
    }

    fn read(&self, dir: &Path) -> Result<(PathBuf, String), ConfigError> {
        let path = Self::config_path(dir);
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                dir: dir.display().to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok((path, content))
    }
}

impl ConfigStore for FsConfigStore {
    fn load(&self, dir: &Path) -> Result<ProjectConfig, ConfigError> {
        let (path, content) = self.read(dir)?;
        let display = path.display().to_string();
        log::debug!("Loading configuration from '{}'", display);

        if !templating::contains_placeholders(&content) {
            return toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                source: e,
            });
        }

        let document: toml::Table = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: display.clone(),
            source: e,
        })?;
        let expanded =
            templating::expand_document(document, &self.os).map_err(|e| ConfigError::Template {
                path: display.clone(),
                source: e,
            })?;
        log::trace!("Placeholders expanded for '{}'", display);

        toml::Value::Table(expanded)
            .try_into::<ProjectConfig>()
            .map_err(|e| ConfigError::Parse {
                path: display,
                source: e,
            })
    }

    fn load_raw(&self, dir: &Path) -> Result<ProjectConfig, ConfigError> {
        let (path, content) = self.read(dir)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn save(&self, dir: &Path, config: &ProjectConfig) -> Result<(), ConfigError> {
        let path = Self::config_path(dir);
        let io_err = |e: std::io::Error| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        };

        let toml_string = toml::to_string_pretty(config)?;
        // Write next to the target and rename over it, so a failed save never truncates it.
        let mut temp_file = NamedTempFile::new_in(dir).map_err(io_err)?;
        temp_file
            .write_all(toml_string.as_bytes())
            .map_err(io_err)?;
        temp_file.flush().map_err(io_err)?;
        temp_file.persist(&path).map_err(|e| ConfigError::Persist {
            path: path.display().to_string(),
            source: e,
        })?;

        log::debug!("Configuration saved to '{}'", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildTarget, Tool};
    use tempfile::tempdir;

    const TEMPLATED: &str = r#"
[project]
name = "app"
tools = ["go"]

[targets.release]
commands = ["go build -o {{ .targets.release.output_dir }}/{{ .project.name }}{{ .exe_ext }}"]
output_dir = "bin/release"
"#;

    #[test]
    fn test_load_expands_placeholders() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILENAME), TEMPLATED).unwrap();

        let config = FsConfigStore::new("windows").load(dir.path()).unwrap();
        assert_eq!(config.project.tools, vec![Tool::Go]);
        assert_eq!(
            config.targets["release"].commands,
            vec!["go build -o bin/release/app.exe"]
        );

        let raw = FsConfigStore::new("windows").load_raw(dir.path()).unwrap();
        assert!(raw.targets["release"].commands[0].contains("{{ .project.name }}"));
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempdir().unwrap();
        let result = FsConfigStore::new("linux").load(dir.path());
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_load_malformed_config() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILENAME), "[project\nname = ").unwrap();
        let result = FsConfigStore::new("linux").load(dir.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_unknown_placeholder() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(PROJECT_CONFIG_FILENAME),
            "[targets.a]\ncommands = [\"echo {{ .nope }}\"]\n",
        )
        .unwrap();
        let result = FsConfigStore::new("linux").load(dir.path());
        assert!(matches!(result, Err(ConfigError::Template { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = FsConfigStore::new("linux");

        let mut config = ProjectConfig::default();
        config.project.name = "saved".to_string();
        config.targets.insert(
            "debug".to_string(),
            BuildTarget {
                commands: vec!["make debug".to_string()],
                ..Default::default()
            },
        );
        store.save(dir.path(), &config).unwrap();

        assert!(FsConfigStore::exists(dir.path()));
        assert_eq!(store.load(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_persist_environment_keeps_placeholders() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILENAME), TEMPLATED).unwrap();
        let store = FsConfigStore::new("linux");

        let env = Environment {
            path: "/bin/sh".to_string(),
            args: vec!["-c".to_string()],
        };
        store.persist_environment(dir.path(), "linux", &env).unwrap();

        let raw = store.load_raw(dir.path()).unwrap();
        assert_eq!(raw.env.get("linux"), Some(&env));
        assert!(raw.targets["release"].commands[0].contains("{{ .targets.release.output_dir }}"));
    }
}
