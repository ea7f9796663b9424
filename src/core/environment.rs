// src/core/environment.rs

//! Execution Environment Provider.
//!
//! Decides which interpreter runs target commands on the host OS. Discovery
//! happens lazily, the first time a project without an `[env.<os>]` entry needs
//! to run a command, and the result is memoized per OS family.

use crate::models::Environment;
use crate::system::executor::{self, ExecutionError};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

const VC_TOOLS_COMPONENT: &str = "Microsoft.VisualStudio.Component.VC.Tools.x86.x64";
const VS_DEV_SHELL_SCRIPT: &str = "Common7\\Tools\\Launch-VsDevShell.ps1";
const VS_DEV_CMD_SCRIPT: &str = "Common7\\Tools\\VsDevCmd.bat";

/// Why no execution environment could be discovered.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    /// The Visual Studio locator is not installed where expected.
    #[error("vswhere.exe was not found at '{0}'.")]
    VsWhereNotFound(String),
    /// No installation ships the requested developer script.
    #[error("'{0}' was not found in any Visual Studio installation.")]
    VsComponentNotFound(String),
    /// Running the locator itself failed.
    #[error("Could not query the Visual Studio installer")]
    Probe(#[from] ExecutionError),
    /// Both developer shells are missing; `source` explains the last attempt.
    #[error(
        "Neither the Developer PowerShell nor the Developer Command Prompt was found; native C/C++ builds cannot run without one"
    )]
    NativeToolchainNotFound {
        #[source]
        source: Box<EnvironmentError>,
    },
}

/// What the provider knows about the machine it runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    /// OS family, as used for the `[env.<os>]` keys.
    pub os: String,
    /// The operator's interactive shell (`$SHELL`), if exposed.
    pub shell: Option<String>,
    /// `%ProgramFiles(x86)%`, where the Visual Studio installer lives.
    pub program_files_x86: Option<PathBuf>,
}

impl HostPlatform {
    /// Captures the platform of the running process.
    pub fn current() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            shell: env::var("SHELL").ok().filter(|s| !s.trim().is_empty()),
            program_files_x86: env::var_os("ProgramFiles(x86)").map(PathBuf::from),
        }
    }

    /// Whether commands need the Windows shell conventions.
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }
}

/// Resolves and memoizes the execution environment of the host OS.
#[derive(Debug)]
pub struct EnvironmentProvider {
    host: HostPlatform,
    cache: HashMap<String, Environment>,
}

impl EnvironmentProvider {
    /// A provider with an empty cache for `host`.
    pub fn new(host: HostPlatform) -> Self {
        Self {
            host,
            cache: HashMap::new(),
        }
    }

    /// Shorthand for `new(HostPlatform::current())`.
    pub fn for_current_host() -> Self {
        Self::new(HostPlatform::current())
    }

    /// The platform environments are discovered for.
    pub fn host(&self) -> &HostPlatform {
        &self.host
    }

    /// Returns the environment for the host OS, discovering it on the first call.
    ///
    /// Subsequent calls return the memoized value until [`Self::clear_cache`] is called.
    ///
    /// # Errors
    /// On Windows, when `requires_native_toolchain` is set and no Visual Studio
    /// developer shell can be found.
    pub fn discover(
        &mut self,
        requires_native_toolchain: bool,
    ) -> Result<Environment, EnvironmentError> {
        if let Some(cached) = self.cache.get(&self.host.os) {
            log::trace!("Using cached environment for '{}'.", self.host.os);
            return Ok(cached.clone());
        }

        let environment = if self.host.is_windows() && requires_native_toolchain {
            self.discover_native_windows()?
        } else {
            self.default_shell()
        };

        log::debug!(
            "Discovered environment for '{}': {} {:?}",
            self.host.os,
            environment.path,
            environment.args
        );
        self.cache
            .insert(self.host.os.clone(), environment.clone());
        Ok(environment)
    }

    /// Forgets every memoized environment; the next [`Self::discover`] runs discovery again.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// The operator's shell if known, otherwise a per-OS default.
    fn default_shell(&self) -> Environment {
        let posix = |path: &str| Environment {
            path: path.to_string(),
            args: vec!["-c".to_string()],
        };

        if let Some(shell) = &self.host.shell {
            return posix(shell);
        }

        match self.host.os.as_str() {
            "windows" => Environment {
                path: "powershell.exe".to_string(),
                args: vec![
                    "-NoProfile".to_string(),
                    "-NoLogo".to_string(),
                    "-Command".to_string(),
                ],
            },
            "macos" => posix("/bin/zsh"),
            _ => posix("/bin/bash"),
        }
    }

    /// Developer PowerShell first, then the Developer Command Prompt.
    fn discover_native_windows(&self) -> Result<Environment, EnvironmentError> {
        let shell_error = match self.find_vs_tool(VS_DEV_SHELL_SCRIPT) {
            Ok(script) => {
                let install_path = self.find_vs_install_path()?;
                return Ok(Environment {
                    path: "powershell.exe".to_string(),
                    args: vec![
                        "-NoProfile".to_string(),
                        "-NoLogo".to_string(),
                        "-Command".to_string(),
                        format!(
                            "& {{ . '{}' -VsInstallPath '{}' -Arch amd64 -HostArch amd64 }}",
                            script, install_path
                        ),
                    ],
                });
            }
            Err(e) => e,
        };
        log::debug!("Developer PowerShell unavailable: {}", shell_error);

        match self.find_vs_tool(VS_DEV_CMD_SCRIPT) {
            Ok(script) => Ok(Environment {
                path: "cmd.exe".to_string(),
                args: vec!["/c".to_string(), script],
            }),
            Err(e) => Err(EnvironmentError::NativeToolchainNotFound {
                source: Box::new(e),
            }),
        }
    }

    fn vswhere_path(&self) -> Result<PathBuf, EnvironmentError> {
        let base = self.host.program_files_x86.clone().unwrap_or_default();
        let vswhere = base
            .join("Microsoft Visual Studio")
            .join("Installer")
            .join("vswhere.exe");
        if !vswhere.is_file() {
            return Err(EnvironmentError::VsWhereNotFound(
                vswhere.display().to_string(),
            ));
        }
        Ok(vswhere)
    }

    fn find_vs_tool(&self, pattern: &str) -> Result<String, EnvironmentError> {
        let vswhere = self.vswhere_path()?;
        let output = executor::execute_and_capture_output(
            &vswhere,
            &[
                "-latest",
                "-products",
                "*",
                "-requires",
                VC_TOOLS_COMPONENT,
                "-find",
                pattern,
            ],
        )?;
        first_line(&output).ok_or_else(|| EnvironmentError::VsComponentNotFound(pattern.to_string()))
    }

    fn find_vs_install_path(&self) -> Result<String, EnvironmentError> {
        let vswhere = self.vswhere_path()?;
        let output = executor::execute_and_capture_output(
            &vswhere,
            &["-latest", "-products", "*", "-property", "installationPath"],
        )?;
        first_line(&output)
            .ok_or_else(|| EnvironmentError::VsComponentNotFound("installationPath".to_string()))
    }
}

fn first_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(os: &str, shell: Option<&str>) -> HostPlatform {
        HostPlatform {
            os: os.to_string(),
            shell: shell.map(str::to_string),
            program_files_x86: None,
        }
    }

    #[test]
    fn test_prefers_operator_shell() {
        let mut provider = EnvironmentProvider::new(host("linux", Some("/usr/bin/fish")));
        let env = provider.discover(false).unwrap();
        assert_eq!(env.path, "/usr/bin/fish");
        assert_eq!(env.args, vec!["-c"]);
    }

    #[test]
    fn test_per_os_defaults() {
        let linux = EnvironmentProvider::new(host("linux", None))
            .discover(false)
            .unwrap();
        assert_eq!(linux.path, "/bin/bash");

        let macos = EnvironmentProvider::new(host("macos", None))
            .discover(true)
            .unwrap();
        assert_eq!(macos.path, "/bin/zsh");
        assert_eq!(macos.args, vec!["-c"]);

        let windows = EnvironmentProvider::new(host("windows", None))
            .discover(false)
            .unwrap();
        assert_eq!(windows.path, "powershell.exe");
        assert_eq!(windows.args, vec!["-NoProfile", "-NoLogo", "-Command"]);
    }

    #[test]
    fn test_native_toolchain_only_matters_on_windows() {
        let mut provider = EnvironmentProvider::new(host("linux", None));
        assert_eq!(provider.discover(true).unwrap().path, "/bin/bash");
    }

    #[test]
    fn test_windows_native_without_visual_studio_fails() {
        let mut provider = EnvironmentProvider::new(host("windows", None));
        let result = provider.discover(true);
        match result {
            Err(EnvironmentError::NativeToolchainNotFound { source }) => {
                assert!(matches!(*source, EnvironmentError::VsWhereNotFound(_)));
            }
            other => panic!("Expected NativeToolchainNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_result_is_cached_until_cleared() {
        let mut provider = EnvironmentProvider::new(host("linux", Some("/bin/sh")));
        let first = provider.discover(false).unwrap();

        provider.host.shell = Some("/bin/zsh".to_string());
        assert_eq!(provider.discover(false).unwrap(), first);

        provider.clear_cache();
        assert_eq!(provider.discover(false).unwrap().path, "/bin/zsh");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("\n  C:\\VS\\a.bat \r\nC:\\VS\\b.bat"), Some("C:\\VS\\a.bat".to_string()));
        assert_eq!(first_line("   \n"), None);
    }
}
