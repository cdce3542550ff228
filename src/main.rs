//! openapi-gen-request CLI entrypoint
//! Parses command-line arguments and runs the generator.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use openapi_gen_request::{
    application::GenerateRequestUseCase,
    config::{ConfigFile, GenOptions, NamingConvention, OpenApiSource},
    generation::GenerationOrchestrator,
    infrastructure::{
        compiler::TypeScriptCompiler,
        openapi::{CompositeOpenApiLoader, Swagger2Upgrader},
        output::FileSystemOutputService,
        shell::{PrettierFormatter, ProcessExecutor},
    },
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-gen-request")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate request functions and types from an OpenAPI document
    Generate {
        /// Path or URL to the OpenAPI (or Swagger 2.0) document
        #[arg(long)]
        openapi: String,
        /// Output directory, replaced on every run
        #[arg(long)]
        output_dir: PathBuf,
        /// Module the generated files import `request` from
        #[arg(long)]
        axios_file_path: Option<String>,
        /// Import statement replacing the default axios import
        #[arg(long)]
        request_template: Option<String>,
        /// Envelope type for successful responses, `T` is the payload
        #[arg(long)]
        success_response_template: Option<String>,
        /// Header written at the top of every generated file
        #[arg(long)]
        banner_comment: Option<String>,
        /// Prettier config used when formatting the output
        #[arg(long)]
        prettier_config: Option<PathBuf>,
        /// Naming convention for files and functions
        #[arg(long, value_enum, default_value_t = NamingConvention::Default)]
        convention: NamingConvention,
        /// Generate header types (controller convention)
        #[arg(long)]
        header: bool,
        /// Generate cookie types (controller convention)
        #[arg(long)]
        cookie: bool,
    },
    /// Generate using the settings in a config file
    #[command(name = "from-config")]
    FromConfig {
        /// Config file, relative to the working directory
        #[arg(long, default_value = ConfigFile::FILE_NAME)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;

    let options = match cli.command {
        Commands::Generate {
            openapi,
            output_dir,
            axios_file_path,
            request_template,
            success_response_template,
            banner_comment,
            prettier_config,
            convention,
            header,
            cookie,
        } => GenOptions {
            openapi: Some(OpenApiSource::parse(&openapi)),
            output_dir: Some(output_dir),
            axios_file_path,
            request_template,
            success_response_template,
            banner_comment,
            prettier_config,
            convention,
            header,
            cookie,
            ..GenOptions::default()
        },
        Commands::FromConfig { file } => load_config_file(&cwd.join(file))?,
    };

    generate(options, cwd).await
}

fn load_config_file(path: &Path) -> anyhow::Result<GenOptions> {
    info!(path = %path.display(), "Reading config file");
    let config = ConfigFile::load(path)
        .with_context(|| format!("Failed to load config file {}", path.display()))?;
    Ok(config.into_options())
}

async fn generate(options: GenOptions, cwd: PathBuf) -> anyhow::Result<()> {
    let use_case = GenerateRequestUseCase::new(
        Arc::new(CompositeOpenApiLoader::new(cwd.clone())),
        Arc::new(Swagger2Upgrader::new()),
        Arc::new(GenerationOrchestrator::new(
            Arc::new(TypeScriptCompiler::new()),
            cwd.clone(),
        )),
        Arc::new(FileSystemOutputService::new()),
        Arc::new(PrettierFormatter::new(
            Arc::new(ProcessExecutor::new()),
            cwd,
        )),
    );

    let response = use_case
        .execute(&options)
        .await
        .context("Failed to generate request files")?;

    info!(
        "Generated {} files for {} operations in {}",
        response.files_count,
        response.api_count,
        response.output_path.display()
    );
    Ok(())
}
