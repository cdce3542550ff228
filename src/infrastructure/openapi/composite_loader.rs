//! Composite OpenAPI loader dispatching on the source kind

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::PathBuf;

use super::{FileOpenApiLoader, HttpOpenApiLoader};
use crate::generation::{GenerationError, OpenApiLoader};

/// Sends URLs to the HTTP loader and everything else to the file loader
pub struct CompositeOpenApiLoader {
    http: HttpOpenApiLoader,
    file: FileOpenApiLoader,
}

impl CompositeOpenApiLoader {
    /// Relative file sources resolve against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            http: HttpOpenApiLoader::new(),
            file: FileOpenApiLoader::new(base_dir),
        }
    }
}

impl Default for CompositeOpenApiLoader {
    fn default() -> Self {
        Self {
            http: HttpOpenApiLoader::default(),
            file: FileOpenApiLoader::default(),
        }
    }
}

#[async_trait]
impl OpenApiLoader for CompositeOpenApiLoader {
    async fn load(&self, source: &str) -> Result<JsonValue, GenerationError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            tracing::debug!("CompositeOpenApiLoader: Using HTTP loader for {source}");
            self.http.load(source).await
        } else {
            tracing::debug!("CompositeOpenApiLoader: Using file loader for {source}");
            self.file.load(source).await
        }
    }
}
