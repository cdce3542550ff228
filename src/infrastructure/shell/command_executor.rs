//! Running external programs from the output directory's project root

use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::generation::GenerationError;

/// A program and its arguments, run without a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit code and captured output of a finished program
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        command: &CommandSpec,
        working_dir: &Path,
    ) -> Result<CommandOutput, GenerationError>;
}

/// Spawns the program with tokio and waits for it
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(
        &self,
        command: &CommandSpec,
        working_dir: &Path,
    ) -> Result<CommandOutput, GenerationError> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| GenerationError::PostProcessing(format!("cannot run `{command}`: {e}")))?;

        Ok(CommandOutput {
            // killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Records every command it is asked to run and fails the ones it was not
/// primed for
#[cfg(test)]
#[derive(Default)]
pub struct RecordingExecutor {
    outputs: std::collections::HashMap<String, CommandOutput>,
    calls: std::sync::Mutex<Vec<CommandSpec>>,
}

#[cfg(test)]
impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primes the answer for the command whose display form is `command`
    pub fn answering(mut self, command: &str, exit_code: i32, stderr: &str) -> Self {
        self.outputs.insert(
            command.to_string(),
            CommandOutput {
                exit_code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(
        &self,
        command: &CommandSpec,
        _working_dir: &Path,
    ) -> Result<CommandOutput, GenerationError> {
        self.calls.lock().unwrap().push(command.clone());
        self.outputs
            .get(&command.to_string())
            .cloned()
            .ok_or_else(|| GenerationError::PostProcessing(format!("no such program: {command}")))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_command_spec_display() {
        let command = CommandSpec::new("/bin/prettier")
            .arg("--write")
            .arg("out/**/*");
        assert_eq!(command.to_string(), "/bin/prettier --write out/**/*");
    }

    #[tokio::test]
    async fn test_process_executor_captures_output() {
        let dir = tempdir().unwrap();
        let command = CommandSpec::new("echo").arg("hello world");

        let output = ProcessExecutor::new().execute(&command, dir.path()).await.unwrap();
        assert!(output.is_success());
        assert_eq!(output.stdout, "hello world\n");
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_process_executor_reports_exit_code() {
        let dir = tempdir().unwrap();
        let command = CommandSpec::new("sh").arg("-c").arg("exit 3");

        let output = ProcessExecutor::new().execute(&command, dir.path()).await.unwrap();
        assert!(!output.is_success());
        assert_eq!(output.exit_code, 3);
    }

    #[tokio::test]
    async fn test_process_executor_runs_in_working_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();

        let output = ProcessExecutor::new()
            .execute(&CommandSpec::new("ls"), dir.path())
            .await
            .unwrap();
        assert!(output.stdout.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_process_executor_missing_program() {
        let dir = tempdir().unwrap();
        let command = CommandSpec::new(dir.path().join("not-installed"));

        let err = ProcessExecutor::new().execute(&command, dir.path()).await.unwrap_err();
        assert!(matches!(err, GenerationError::PostProcessing(_)));
        assert!(err.to_string().contains("not-installed"));
    }

    #[tokio::test]
    async fn test_recording_executor() {
        let dir = tempdir().unwrap();
        let executor = RecordingExecutor::new().answering("prettier --check", 1, "unformatted");

        let output = executor
            .execute(&CommandSpec::new("prettier").arg("--check"), dir.path())
            .await
            .unwrap();
        assert_eq!(output.stderr, "unformatted");
        assert!(
            executor
                .execute(&CommandSpec::new("eslint"), dir.path())
                .await
                .is_err()
        );
        assert_eq!(executor.calls().len(), 2);
    }
}
