//! Port interfaces for the generation domain

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::generation::{Definitions, GenerationError};

/// Loads a raw OpenAPI (or Swagger) document
#[async_trait]
pub trait OpenApiLoader: Send + Sync {
    /// Load a document from a file path or URL
    async fn load(&self, source: &str) -> Result<JsonValue, GenerationError>;
}

/// Brings any supported document version up to OpenAPI v3
pub trait DocumentUpgrader: Send + Sync {
    fn upgrade(&self, document: JsonValue) -> Result<JsonValue, GenerationError>;
}

/// Renders a JSON-Schema node as TypeScript declarations.
///
/// The root is declared under `name`. References into `definitions` resolve
/// against the supplied set, which must already be free of self-cycles.
pub trait SchemaCompiler: Send + Sync {
    fn compile(
        &self,
        schema: &JsonValue,
        name: &str,
        definitions: &Definitions,
    ) -> Result<String, GenerationError>;
}
