//! Generation orchestration - runs the pipeline over one OpenAPI v3 document

use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Config, GenOptions, process_config};
use crate::generation::definitions::collect_definitions;
use crate::generation::output::assemble_output;
use crate::generation::refs::normalize_refs;
use crate::generation::resolver::resolve_apis;
use crate::generation::{GenerationError, OutputFile, SchemaCompiler};
use crate::infrastructure::openapi::ApiExtractor;

/// What one run produced
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub config: Config,
    pub files: Vec<OutputFile>,
    pub api_count: usize,
}

/// Turns an upgraded document into the generated file set
pub struct GenerationOrchestrator {
    compiler: Arc<dyn SchemaCompiler>,
    extractor: ApiExtractor,
    cwd: PathBuf,
}

impl GenerationOrchestrator {
    /// `cwd` anchors a relative `output_dir`
    pub fn new(compiler: Arc<dyn SchemaCompiler>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            compiler,
            extractor: ApiExtractor::new(),
            cwd: cwd.into(),
        }
    }

    /// Execute the generation workflow. Any failing operation aborts the run.
    pub fn generate(
        &self,
        document: &JsonValue,
        options: &GenOptions,
    ) -> Result<GenerationResult, GenerationError> {
        // 1. Flatten references into the definitions namespace
        let document = normalize_refs(document);

        // 2. Collect definitions, self-cycles already broken
        let definitions = Arc::new(collect_definitions(&document));

        // 3. Build the effective config and resolver table
        let config = process_config(
            options,
            Arc::clone(&definitions),
            Arc::clone(&self.compiler),
            &self.cwd,
        )?;

        // 4. One Api per path and method
        let apis = self.extractor.extract(&document);

        // 5. Resolve every field of every Api
        let resolved = resolve_apis(&apis, &config.resolver)?;
        tracing::debug!("Resolved {} operations", resolved.len());

        // 6. Assemble the output files
        let files = assemble_output(&resolved, &definitions, self.compiler.as_ref(), &config)?;
        tracing::debug!("Assembled {} output files", files.len());

        Ok(GenerationResult {
            config,
            files,
            api_count: apis.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingConvention;
    use crate::infrastructure::compiler::TypeScriptCompiler;
    use serde_json::json;
    use std::path::Path;

    fn orchestrator() -> GenerationOrchestrator {
        GenerationOrchestrator::new(Arc::new(TypeScriptCompiler::new()), "/work")
    }

    fn document() -> JsonValue {
        json!({
            "openapi": "3.0.0",
            "info": { "title": "Test", "version": "1.0.0" },
            "paths": {
                "/user": {
                    "get": {
                        "tags": ["TestController"],
                        "operationId": "TestController.user.getUser",
                        "parameters": [
                            { "name": "id", "in": "query", "required": true, "schema": { "type": "integer" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/user.Info" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "user.Info": {
                        "type": "object",
                        "properties": { "name": { "type": "string" } }
                    }
                }
            }
        })
    }

    fn paths(result: &GenerationResult) -> Vec<&Path> {
        result.files.iter().map(|f| f.path.as_path()).collect()
    }

    #[test]
    fn test_generate_default_convention() {
        let options = GenOptions::new(document(), "out");
        let result = orchestrator().generate(&document(), &options).unwrap();

        assert_eq!(result.api_count, 1);
        assert_eq!(result.config.output_dir, PathBuf::from("/work/out"));
        assert_eq!(
            paths(&result),
            vec![
                Path::new("common.d.ts"),
                Path::new("types.d.ts"),
                Path::new("types/TestController.d.ts"),
                Path::new("apis/TestController.ts"),
            ]
        );

        let common = &result.files[0].content;
        assert!(common.contains("export interface UserInfo"));
    }

    #[test]
    fn test_generate_controller_convention() {
        let mut options = GenOptions::new(document(), "/abs/out");
        options.convention = NamingConvention::Controller;
        let result = orchestrator().generate(&document(), &options).unwrap();

        assert_eq!(result.config.output_dir, PathBuf::from("/abs/out"));
        let api = result
            .files
            .iter()
            .find(|f| f.path == Path::new("apis/test.ts"))
            .expect("controller group file");
        assert!(api.content.contains("getUser"));
        assert!(api.content.contains("method: 'GET'"));
    }

    #[test]
    fn test_generate_without_definitions_skips_common() {
        let document = json!({
            "openapi": "3.0.0",
            "paths": { "/ping": { "get": { "responses": {} } } }
        });
        let options = GenOptions::new(document.clone(), "out");
        let result = orchestrator().generate(&document, &options).unwrap();
        assert!(!paths(&result).contains(&Path::new("common.d.ts")));
        assert!(paths(&result).contains(&Path::new("types.d.ts")));
    }

    #[test]
    fn test_generate_rejects_bad_config() {
        let mut options = GenOptions::new(document(), "out");
        options.request_template = Some("import axios from 'axios'".to_string());
        let err = orchestrator().generate(&document(), &options).unwrap_err();
        assert!(matches!(err, GenerationError::Config(_)));
    }
}
