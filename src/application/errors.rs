//! Application layer error types

use thiserror::Error;

/// Application layer errors
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Generation(#[from] crate::generation::GenerationError),

    #[error("[openapi-gen-request]: output error: {0}")]
    Output(String),
}

impl ApplicationError {
    pub fn output<S: Into<String>>(msg: S) -> Self {
        Self::Output(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;

    #[test]
    fn test_generation_error_is_transparent() {
        let error: ApplicationError = GenerationError::load("missing.json does not exist").into();
        assert!(matches!(error, ApplicationError::Generation(_)));
        assert_eq!(
            error.to_string(),
            "[openapi-gen-request]: failed to load OpenAPI document: missing.json does not exist"
        );
    }

    #[test]
    fn test_output_error_message() {
        let error = ApplicationError::output("Failed to create directory /out");
        assert_eq!(
            error.to_string(),
            "[openapi-gen-request]: output error: Failed to create directory /out"
        );
    }
}
