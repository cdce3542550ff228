//! Output service implementations

pub mod filesystem_output;

pub use filesystem_output::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::OutputService;
    use crate::generation::OutputFile;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_filesystem_output_write_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_dir = temp_dir.path().join("api");
        let output_service = FileSystemOutputService::new();

        let files = vec![
            OutputFile::new("types.d.ts", "export * from './types/user'"),
            OutputFile::new("apis/user.ts", "import request from 'axios'\n"),
        ];

        let result = output_service
            .write_output(&output_dir, "/* banner */\n", &files)
            .await;
        assert!(result.is_ok());

        let index = std::fs::read_to_string(output_dir.join("types.d.ts"))
            .expect("Failed to read types.d.ts");
        assert_eq!(index, "/* banner */\nexport * from './types/user'");

        let api = std::fs::read_to_string(output_dir.join("apis/user.ts"))
            .expect("Failed to read apis/user.ts");
        assert_eq!(api, "/* banner */\nimport request from 'axios'\n");
    }

    #[tokio::test]
    async fn test_filesystem_output_always_creates_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_dir = temp_dir.path().join("deeply/nested/api");
        let output_service = FileSystemOutputService::new();

        output_service
            .write_output(&output_dir, "", &[])
            .await
            .expect("write should succeed");

        assert!(output_dir.join("apis").is_dir());
        assert!(output_dir.join("types").is_dir());
    }

    #[tokio::test]
    async fn test_filesystem_output_replaces_previous_run() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_dir = temp_dir.path().join("api");
        std::fs::create_dir_all(output_dir.join("apis")).unwrap();
        std::fs::write(output_dir.join("apis/stale.ts"), "old").unwrap();

        let output_service = FileSystemOutputService::new();
        output_service
            .write_output(&output_dir, "", &[OutputFile::new("types.d.ts", "")])
            .await
            .expect("write should succeed");

        assert!(!output_dir.join("apis/stale.ts").exists());
        assert!(output_dir.join("types.d.ts").exists());
    }

    #[tokio::test]
    async fn test_filesystem_output_reports_unwritable_target() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "file in the way").unwrap();

        let output_service = FileSystemOutputService::new();
        let err = output_service
            .write_output(&blocker.join("api"), "", &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to create directory"));
    }
}
