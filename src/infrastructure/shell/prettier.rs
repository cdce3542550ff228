//! Prettier formatting of the generated output

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::Formatter;
use crate::infrastructure::shell::{CommandExecutor, CommandSpec};

/// Runs the project's local prettier over the output directory, if installed
pub struct PrettierFormatter {
    executor: Arc<dyn CommandExecutor>,
    cwd: PathBuf,
}

impl PrettierFormatter {
    /// `cwd` is the project root holding `node_modules`
    pub fn new(executor: Arc<dyn CommandExecutor>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            cwd: cwd.into(),
        }
    }

    fn binary(&self) -> PathBuf {
        self.cwd.join("node_modules").join(".bin").join("prettier")
    }

    /// Prettier expands the glob itself, so no shell is involved
    fn command(&self, output_dir: &Path, config_path: Option<&Path>) -> CommandSpec {
        let mut command = CommandSpec::new(self.binary());
        if let Some(config) = config_path {
            command = command.arg("--config").arg(config);
        }
        command
            .arg("--write")
            .arg(format!("{}/**/*", output_dir.display()))
    }
}

#[async_trait]
impl Formatter for PrettierFormatter {
    async fn format(&self, output_dir: &Path, config_path: Option<&Path>) {
        if !tokio::fs::try_exists(self.binary()).await.unwrap_or(false) {
            tracing::debug!(
                cwd = %self.cwd.display(),
                "prettier not installed, skipping formatting"
            );
            return;
        }

        let command = self.command(output_dir, config_path);
        tracing::debug!(%command, "Formatting generated files");

        match self.executor.execute(&command, &self.cwd).await {
            Ok(result) if result.is_success() => {
                tracing::debug!(output_dir = %output_dir.display(), "Formatted generated files");
            }
            Ok(result) => {
                tracing::warn!(
                    %command,
                    exit_code = result.exit_code,
                    stderr = %result.stderr.trim(),
                    "prettier exited with an error"
                );
            }
            Err(e) => {
                tracing::error!(%command, error = %e, "Failed to run prettier");
            }
        }
    }
}
