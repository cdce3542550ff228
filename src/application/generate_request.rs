//! Use case for generating TypeScript request functions and types

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::application::{ApplicationError, Formatter, OutputService};
use crate::config::{GenOptions, OpenApiSource};
use crate::generation::{
    DocumentUpgrader, GenerationError, GenerationOrchestrator, OpenApiLoader,
};

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequestResponse {
    pub output_path: PathBuf,
    pub files_count: usize,
    pub api_count: usize,
}

/// Load, upgrade, generate, write, format
pub struct GenerateRequestUseCase {
    openapi_loader: Arc<dyn OpenApiLoader>,
    upgrader: Arc<dyn DocumentUpgrader>,
    generation_orchestrator: Arc<GenerationOrchestrator>,
    output_service: Arc<dyn OutputService>,
    formatter: Arc<dyn Formatter>,
}

impl GenerateRequestUseCase {
    pub fn new(
        openapi_loader: Arc<dyn OpenApiLoader>,
        upgrader: Arc<dyn DocumentUpgrader>,
        generation_orchestrator: Arc<GenerationOrchestrator>,
        output_service: Arc<dyn OutputService>,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            openapi_loader,
            upgrader,
            generation_orchestrator,
            output_service,
            formatter,
        }
    }

    pub async fn execute(
        &self,
        options: &GenOptions,
    ) -> Result<GenerateRequestResponse, ApplicationError> {
        let started = Instant::now();

        // 1. Validate options before any I/O
        options.validate()?;

        // 2. Load the document
        let document = match &options.openapi {
            Some(OpenApiSource::Document(document)) => document.clone(),
            Some(OpenApiSource::Path(path)) => {
                self.openapi_loader.load(&path.to_string_lossy()).await?
            }
            Some(OpenApiSource::Url(url)) => self.openapi_loader.load(url).await?,
            None => return Err(GenerationError::config("openapi is required").into()),
        };

        // 3. Bring it up to OpenAPI v3
        let document = self.upgrader.upgrade(document)?;

        // 4. Generate
        let result = self.generation_orchestrator.generate(&document, options)?;
        let config = result.config;

        // 5. Write
        self.output_service
            .write_output(&config.output_dir, &config.banner_comment, &result.files)
            .await?;

        // 6. Format
        self.formatter
            .format(&config.output_dir, config.prettier_config.as_deref())
            .await;

        tracing::info!(
            output_dir = %config.output_dir.display(),
            files = result.files.len(),
            apis = result.api_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generated request files"
        );

        Ok(GenerateRequestResponse {
            output_path: config.output_dir,
            files_count: result.files.len(),
            api_count: result.api_count,
        })
    }
}
