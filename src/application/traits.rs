//! Port interfaces for the application layer

use async_trait::async_trait;
use std::path::Path;

use crate::application::ApplicationError;
use crate::generation::OutputFile;

/// Service for writing generated files to the output destination
#[async_trait]
pub trait OutputService: Send + Sync {
    /// Replaces `output_dir` with `files`, each prefixed with `banner`
    async fn write_output(
        &self,
        output_dir: &Path,
        banner: &str,
        files: &[OutputFile],
    ) -> Result<(), ApplicationError>;
}

/// Post-write formatting of the output directory. Never fails the run.
#[async_trait]
pub trait Formatter: Send + Sync {
    async fn format(&self, output_dir: &Path, config_path: Option<&Path>);
}
