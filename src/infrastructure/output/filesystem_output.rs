//! Filesystem-based output service implementation

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::{ApplicationError, OutputService};
use crate::generation::OutputFile;

/// Subdirectories created on every run, even when empty
const OUTPUT_SUBDIRS: [&str; 2] = ["apis", "types"];

/// Output service that replaces the output directory on disk
pub struct FileSystemOutputService;

impl FileSystemOutputService {
    pub fn new() -> Self {
        Self
    }

    async fn reset_directory(&self, output_dir: &Path) -> Result<(), ApplicationError> {
        if fs::try_exists(output_dir).await.unwrap_or(false) {
            fs::remove_dir_all(output_dir).await.map_err(|e| {
                ApplicationError::output(format!(
                    "Failed to remove directory {}: {}",
                    output_dir.display(),
                    e
                ))
            })?;
        }

        for subdir in OUTPUT_SUBDIRS {
            let path = output_dir.join(subdir);
            fs::create_dir_all(&path).await.map_err(|e| {
                ApplicationError::output(format!(
                    "Failed to create directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

impl Default for FileSystemOutputService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputService for FileSystemOutputService {
    async fn write_output(
        &self,
        output_dir: &Path,
        banner: &str,
        files: &[OutputFile],
    ) -> Result<(), ApplicationError> {
        self.reset_directory(output_dir).await?;

        for output in files {
            let path = output_dir.join(&output.path);

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    ApplicationError::output(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }

            let mut file = fs::File::create(&path).await.map_err(|e| {
                ApplicationError::output(format!("Failed to create file {}: {}", path.display(), e))
            })?;

            let written = async {
                file.write_all(banner.as_bytes()).await?;
                file.write_all(output.content.as_bytes()).await?;
                file.flush().await?;
                Ok::<_, std::io::Error>(())
            }
            .await;
            written.map_err(|e| {
                ApplicationError::output(format!("Failed to write file {}: {}", path.display(), e))
            })?;
        }

        tracing::debug!(
            output_dir = %output_dir.display(),
            "Wrote {} files",
            files.len()
        );
        Ok(())
    }
}
