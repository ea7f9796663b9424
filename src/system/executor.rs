// src/system/executor.rs

use crate::models::Environment;
use crate::system::shell;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("No interpreter configured to run '{0}'.")]
    EmptyInterpreter(String),
    #[error("'{program}' could not be started")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{program}' exited with {status}.")]
    NonZeroExitStatus {
        program: String,
        status: std::process::ExitStatus,
    },
    #[error("'{program}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        program: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Runs `command_line` through the interpreter of `environment`, blocking until it exits.
///
/// The child inherits stdin, stdout and stderr, and runs with `working_root` as
/// its current directory. A non-zero exit status is an error.
pub fn execute_command(
    command_line: &str,
    environment: &Environment,
    working_root: &Path,
) -> Result<(), ExecutionError> {
    if environment.path.trim().is_empty() {
        return Err(ExecutionError::EmptyInterpreter(command_line.to_string()));
    }

    let args = shell::build_invocation(environment, command_line);
    let clean_cwd = dunce::simplified(working_root);
    log::debug!(
        "Spawning '{}' with {:?} in '{}'",
        environment.path,
        args,
        clean_cwd.display()
    );

    let status = StdCommand::new(&environment.path)
        .args(&args)
        .current_dir(clean_cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| ExecutionError::Spawn {
            program: environment.path.clone(),
            source: e,
        })?;

    if !status.success() {
        return Err(ExecutionError::NonZeroExitStatus {
            program: environment.path.clone(),
            status,
        });
    }
    Ok(())
}

/// Runs `program` directly (no shell) and captures its standard output.
/// Stderr is passed through to the user's terminal.
/// Intended for short-lived probes such as locating an installed toolchain.
pub fn execute_and_capture_output(program: &Path, args: &[&str]) -> Result<String, ExecutionError> {
    let program_name = program.display().to_string();
    log::trace!("Capturing output of '{}' {:?}", program_name, args);

    let output = StdCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|e| ExecutionError::Spawn {
            program: program_name.clone(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus {
            program: program_name,
            status: output.status,
        });
    }

    String::from_utf8(output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
        program: program_name,
        source: e,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sh() -> Environment {
        Environment {
            path: "/bin/sh".to_string(),
            args: vec!["-c".to_string()],
        }
    }

    #[test]
    fn test_execute_runs_in_working_root() {
        let dir = tempdir().unwrap();
        execute_command("echo hello > greeting.txt", &sh(), dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("greeting.txt")).unwrap();
        assert_eq!(content.trim(), "hello");
    }

    #[test]
    fn test_execute_non_zero_exit_is_error() {
        let dir = tempdir().unwrap();
        let result = execute_command("exit 3", &sh(), dir.path());
        assert!(matches!(
            result,
            Err(ExecutionError::NonZeroExitStatus { .. })
        ));
    }

    #[test]
    fn test_execute_missing_interpreter_is_spawn_error() {
        let dir = tempdir().unwrap();
        let env = Environment {
            path: "/definitely/not/a/shell".to_string(),
            args: vec!["-c".to_string()],
        };
        let result = execute_command("true", &env, dir.path());
        assert!(matches!(result, Err(ExecutionError::Spawn { .. })));
    }

    #[test]
    fn test_execute_empty_interpreter() {
        let dir = tempdir().unwrap();
        let result = execute_command("true", &Environment::default(), dir.path());
        assert!(matches!(result, Err(ExecutionError::EmptyInterpreter(_))));
    }

    #[test]
    fn test_capture_output() {
        let output = execute_and_capture_output(Path::new("/bin/sh"), &["-c", "echo ready"]).unwrap();
        assert_eq!(output.trim(), "ready");
    }
}
