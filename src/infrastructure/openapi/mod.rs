//! OpenAPI document loading, upgrading and operation extraction

pub mod composite_loader;
pub mod file_loader;
pub mod http_loader;
pub mod parser;
pub mod upgrade;

pub use composite_loader::CompositeOpenApiLoader;
pub use file_loader::FileOpenApiLoader;
pub use http_loader::HttpOpenApiLoader;
pub use parser::{ApiExtractor, HttpMethod};
pub use upgrade::Swagger2Upgrader;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationError, OpenApiLoader};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const SPEC_JSON: &str = r#"{
        "openapi": "3.0.0",
        "info": { "title": "Test API", "version": "1.0.0" },
        "paths": {}
    }"#;

    #[tokio::test]
    async fn test_file_openapi_loader_json() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(SPEC_JSON.as_bytes())
            .expect("Failed to write temp file");
        temp_file.flush().expect("Failed to flush temp file");

        let loader = FileOpenApiLoader::default();
        let document = loader
            .load(temp_file.path().to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(document["openapi"], "3.0.0");
        assert_eq!(document["info"]["title"], "Test API");
    }

    #[tokio::test]
    async fn test_file_openapi_loader_yaml() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(
            temp_dir.path().join("openapi.yaml"),
            "openapi: 3.0.0\ninfo:\n  title: Test API\n  version: 1.0.0\npaths: {}",
        )
        .expect("Failed to write spec");

        let loader = FileOpenApiLoader::new(temp_dir.path());
        let document = loader.load("openapi.yaml").await.unwrap();
        assert_eq!(document["info"]["title"], "Test API");
    }

    #[tokio::test]
    async fn test_file_openapi_loader_resolves_relative_paths() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir(temp_dir.path().join("doc")).unwrap();
        std::fs::write(temp_dir.path().join("doc/openapi.json"), SPEC_JSON).unwrap();

        let loader = FileOpenApiLoader::new(temp_dir.path());
        assert!(loader.load("./doc/openapi.json").await.is_ok());
    }

    #[tokio::test]
    async fn test_file_openapi_loader_not_found() {
        let loader = FileOpenApiLoader::default();
        let err = loader.load("/nonexistent/file.json").await.unwrap_err();
        assert!(matches!(err, GenerationError::Load(_)));
        assert!(err.to_string().contains("/nonexistent/file.json"));
    }

    #[tokio::test]
    async fn test_file_openapi_loader_rejects_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let loader = FileOpenApiLoader::default();
        let err = loader
            .load(temp_dir.path().to_str().unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("is not a file"));
    }

    #[tokio::test]
    async fn test_file_openapi_loader_unreadable_content_names_the_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("binary.json"), [0xff, 0xfe, 0x00]).unwrap();

        let loader = FileOpenApiLoader::new(temp_dir.path());
        let err = loader.load("binary.json").await.unwrap_err();
        assert!(matches!(err, GenerationError::Load(_)));
        assert!(err.to_string().contains("cannot read binary.json"));
    }

    #[tokio::test]
    async fn test_file_openapi_loader_invalid_json() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file.write_all(b"{ not json").unwrap();
        temp_file.flush().unwrap();

        let loader = FileOpenApiLoader::default();
        let err = loader
            .load(temp_file.path().to_str().unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a valid OpenAPI document"));
    }

    #[tokio::test]
    async fn test_composite_loader_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("openapi.json"), SPEC_JSON).unwrap();

        let loader = CompositeOpenApiLoader::new(temp_dir.path());
        assert!(loader.load("openapi.json").await.is_ok());
    }

    #[tokio::test]
    async fn test_composite_loader_http() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api-spec.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SPEC_JSON)
                    .insert_header("content-type", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let loader = CompositeOpenApiLoader::default();
        let url = format!("{}/api-spec.json", mock_server.uri());
        let document = loader.load(&url).await.unwrap();
        assert_eq!(document["info"]["title"], "Test API");
    }
}
