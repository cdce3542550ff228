//! File-based OpenAPI document loader

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::generation::{GenerationError, OpenApiLoader};

/// Loads OpenAPI documents from local files
pub struct FileOpenApiLoader {
    base_dir: PathBuf,
}

impl FileOpenApiLoader {
    /// Relative sources resolve against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, source: &str) -> PathBuf {
        let path = Path::new(source);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl Default for FileOpenApiLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

#[async_trait]
impl OpenApiLoader for FileOpenApiLoader {
    async fn load(&self, source: &str) -> Result<JsonValue, GenerationError> {
        let path = self.resolve(source);

        let metadata = fs::metadata(&path).await.map_err(|e| {
            GenerationError::load(format!("{source} does not exist ({}): {e}", path.display()))
        })?;
        if !metadata.is_file() {
            return Err(GenerationError::load(format!("{source} is not a file")));
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            GenerationError::load(format!("cannot read {source} ({}): {e}", path.display()))
        })?;

        let document: JsonValue = if source.ends_with(".yaml") || source.ends_with(".yml") {
            serde_yaml::from_str(&content).map_err(|e| {
                GenerationError::load(format!("{source} is not a valid OpenAPI document: {e}"))
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                GenerationError::load(format!("{source} is not a valid OpenAPI document: {e}"))
            })?
        };

        tracing::debug!(path = %path.display(), "Loaded OpenAPI document from file");
        Ok(document)
    }
}
