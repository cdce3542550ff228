//! Error types for the generation domain

use thiserror::Error;

/// Errors that can occur while turning an OpenAPI document into TypeScript
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("[openapi-gen-request]: invalid configuration: {0}")]
    Config(String),

    #[error("[openapi-gen-request]: failed to load OpenAPI document: {0}")]
    Load(String),

    #[error("[openapi-gen-request]: conversion failed: {0}")]
    Conversion(String),

    #[error("[openapi-gen-request]: cannot compile schema `{name}`: {reason}")]
    Compile { name: String, reason: String },

    #[error("failed to resolve {method} {url}: {source}")]
    Resolve {
        method: String,
        url: String,
        #[source]
        source: Box<GenerationError>,
    },

    #[error("[openapi-gen-request]: post-processing error: {0}")]
    PostProcessing(String),

    #[error("[openapi-gen-request]: IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("[openapi-gen-request]: serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GenerationError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn load<S: Into<String>>(msg: S) -> Self {
        Self::Load(msg.into())
    }

    pub fn conversion<S: Into<String>>(msg: S) -> Self {
        Self::Conversion(msg.into())
    }

    pub fn compile<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::Compile {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
