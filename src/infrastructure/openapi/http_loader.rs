//! HTTP-based OpenAPI document loader

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::generation::{GenerationError, OpenApiLoader};

/// Loads OpenAPI documents from HTTP/HTTPS URLs
pub struct HttpOpenApiLoader {
    client: Client,
}

impl HttpOpenApiLoader {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

impl Default for HttpOpenApiLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpenApiLoader for HttpOpenApiLoader {
    async fn load(&self, source: &str) -> Result<JsonValue, GenerationError> {
        if !source.starts_with("http://") && !source.starts_with("https://") {
            return Err(GenerationError::load(format!(
                "HttpOpenApiLoader only handles HTTP(S) URLs, got: {source}"
            )));
        }

        let response = self.client.get(source).send().await.map_err(|e| {
            GenerationError::load(format!("request to {source} failed: {e}"))
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(GenerationError::load(format!(
                "request to {source} did not return a usable response (HTTP {status})"
            )));
        }

        let content = response.text().await.map_err(|e| {
            GenerationError::load(format!("failed to read response body from {source}: {e}"))
        })?;

        let document: JsonValue = serde_json::from_str(&content)
            .or_else(|_| serde_yaml::from_str(&content))
            .map_err(|e| {
                GenerationError::load(format!(
                    "{source} did not return a valid OpenAPI document: {e}"
                ))
            })?;

        tracing::debug!(url = %source, "Fetched OpenAPI document");
        Ok(document)
    }
}
