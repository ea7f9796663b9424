// src/system/shell.rs

use crate::models::Environment;
use std::path::Path;

/// How an interpreter expects to receive a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// `powershell.exe` / `pwsh`: the command is the trailing `-Command` argument.
    PowerShell,
    /// `cmd.exe`: the command is chained after the base arguments with `&&`.
    Cmd,
    /// Any POSIX-style shell: the command is the trailing argument after `-c`.
    Posix,
}

impl ShellKind {
    /// Classifies an interpreter by its file name, case-insensitively.
    pub fn of(interpreter: &str) -> Self {
        let file_name = Path::new(interpreter)
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        // Windows paths reach us on every host (e.g. when reading a shared krill.toml).
        let file_name = file_name
            .rsplit('\\')
            .next()
            .unwrap_or(file_name.as_str())
            .to_string();

        match file_name.as_str() {
            "powershell.exe" | "powershell" | "pwsh.exe" | "pwsh" => ShellKind::PowerShell,
            "cmd.exe" | "cmd" => ShellKind::Cmd,
            _ => ShellKind::Posix,
        }
    }
}

/// Builds the argument vector passed to the environment's interpreter for `command`.
/// The base arguments are cloned, never modified in place.
pub fn build_invocation(environment: &Environment, command: &str) -> Vec<String> {
    let mut args = environment.args.clone();
    match ShellKind::of(&environment.path) {
        ShellKind::Cmd => {
            args.push("&&".to_string());
            args.push(command.to_string());
        }
        ShellKind::PowerShell | ShellKind::Posix => args.push(command.to_string()),
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(path: &str, args: &[&str]) -> Environment {
        Environment {
            path: path.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_shell_kind_detection() {
        assert_eq!(ShellKind::of("powershell.exe"), ShellKind::PowerShell);
        assert_eq!(ShellKind::of("PowerShell.EXE"), ShellKind::PowerShell);
        assert_eq!(ShellKind::of("/usr/bin/pwsh"), ShellKind::PowerShell);
        assert_eq!(
            ShellKind::of("C:\\Windows\\System32\\cmd.exe"),
            ShellKind::Cmd
        );
        assert_eq!(ShellKind::of("cmd.exe"), ShellKind::Cmd);
        assert_eq!(ShellKind::of("/bin/bash"), ShellKind::Posix);
        assert_eq!(ShellKind::of("/usr/bin/zsh"), ShellKind::Posix);
        assert_eq!(ShellKind::of(""), ShellKind::Posix);
    }

    #[test]
    fn test_posix_invocation() {
        let shell = env("/bin/bash", &["-c"]);
        assert_eq!(
            build_invocation(&shell, "cargo build --release"),
            vec!["-c", "cargo build --release"]
        );
        // Base arguments are untouched for the next command.
        assert_eq!(shell.args, vec!["-c"]);
    }

    #[test]
    fn test_powershell_invocation() {
        let shell = env("powershell.exe", &["-NoProfile", "-NoLogo", "-Command"]);
        assert_eq!(
            build_invocation(&shell, "dotnet build"),
            vec!["-NoProfile", "-NoLogo", "-Command", "dotnet build"]
        );
    }

    #[test]
    fn test_cmd_invocation_chains_with_and() {
        let shell = env("cmd.exe", &["/c", "C:\\VS\\VsDevCmd.bat"]);
        assert_eq!(
            build_invocation(&shell, "cmake --build out"),
            vec!["/c", "C:\\VS\\VsDevCmd.bat", "&&", "cmake --build out"]
        );
    }
}
