//! Generator configuration
//!
//! [`GenOptions`] is what a caller hands in (built from CLI flags, a
//! [`ConfigFile`], or directly through the library API). [`process_config`]
//! validates it and fills in every default, producing the [`Config`] the
//! pipeline runs with.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::generation::resolver::{Resolver, ResolverOverrides};
use crate::generation::{Definitions, GenerationError, SchemaCompiler};

/// Header written at the top of every generated file unless overridden
pub const DEFAULT_BANNER: &str = "/* eslint-disable */
// @ts-nocheck
/**
 * This file is generated by openapi-gen-request, do not edit it by hand.
 * Change the source document and regenerate instead.
 */

";

pub const DEFAULT_AXIOS_FILE_PATH: &str = "axios";

/// Where the OpenAPI document comes from
#[derive(Debug, Clone, PartialEq)]
pub enum OpenApiSource {
    /// Local JSON (or YAML) file, relative paths resolve against the cwd
    Path(PathBuf),
    /// `http://` or `https://` URL
    Url(String),
    /// An already parsed document
    Document(JsonValue),
}

impl OpenApiSource {
    /// Classifies a path-or-URL string
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::Url(source.to_string())
        } else {
            Self::Path(PathBuf::from(source))
        }
    }
}

impl From<&str> for OpenApiSource {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

impl From<JsonValue> for OpenApiSource {
    fn from(document: JsonValue) -> Self {
        Self::Document(document)
    }
}

/// Preset resolver overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    /// Group by first tag, name functions by operationId
    #[default]
    Default,
    /// Strip `Controller` from tags, take the method segment of dotted ids
    Controller,
}

/// Caller-facing generation options
#[derive(Debug, Clone, Default)]
pub struct GenOptions {
    pub openapi: Option<OpenApiSource>,
    pub output_dir: Option<PathBuf>,
    /// Module the generated files import `request` from. An absolute path is
    /// rewritten relative to `<output_dir>/apis`.
    pub axios_file_path: Option<String>,
    /// Full import statement replacing the axios import. Must import `request`.
    pub request_template: Option<String>,
    /// Envelope type wrapping every successful response, with `T` as the data
    pub success_response_template: Option<String>,
    pub banner_comment: Option<String>,
    pub prettier_config: Option<PathBuf>,
    pub convention: NamingConvention,
    /// Generate header types (controller convention only)
    pub header: bool,
    /// Generate cookie types (controller convention only)
    pub cookie: bool,
    /// Caller overrides, applied last
    pub resolver: ResolverOverrides,
}

impl GenOptions {
    pub fn new(openapi: impl Into<OpenApiSource>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            openapi: Some(openapi.into()),
            output_dir: Some(output_dir.into()),
            ..Self::default()
        }
    }

    /// Checks everything that can be checked without touching the network or
    /// filesystem.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.openapi.is_none() {
            return Err(GenerationError::config("openapi is required"));
        }
        self.validate_output()
    }

    fn validate_output(&self) -> Result<(), GenerationError> {
        if self
            .output_dir
            .as_ref()
            .is_none_or(|dir| dir.as_os_str().is_empty())
        {
            return Err(GenerationError::config("outputDir is required"));
        }
        if let Some(template) = &self.request_template {
            if !template.contains("request") {
                return Err(GenerationError::config(format!(
                    "requestTemplate must import `request`, e.g. import {{ request }} from \"../utils/request\" (got `{template}`)"
                )));
            }
        }
        Ok(())
    }

    /// The overrides implied by the naming convention, with the caller's own
    /// overrides layered on top
    fn overrides(&self) -> ResolverOverrides {
        let preset = match self.convention {
            NamingConvention::Default => ResolverOverrides::new(),
            NamingConvention::Controller => {
                ResolverOverrides::controller_convention(self.header, self.cookie)
            }
        };
        preset.and(self.resolver.clone())
    }
}

/// Fully resolved settings the pipeline runs with
#[derive(Debug, Clone)]
pub struct Config {
    /// Always absolute
    pub output_dir: PathBuf,
    pub axios_file_path: String,
    pub request_template: Option<String>,
    pub success_response_template: Option<String>,
    pub banner_comment: String,
    pub prettier_config: Option<PathBuf>,
    pub resolver: Resolver,
}

#[cfg(test)]
impl Config {
    pub(crate) fn for_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        use crate::infrastructure::compiler::TypeScriptCompiler;

        Self {
            output_dir: output_dir.into(),
            axios_file_path: DEFAULT_AXIOS_FILE_PATH.to_string(),
            request_template: None,
            success_response_template: None,
            banner_comment: DEFAULT_BANNER.to_string(),
            prettier_config: None,
            resolver: Resolver::defaults(
                Arc::new(Definitions::new()),
                Arc::new(TypeScriptCompiler::new()),
            ),
        }
    }
}

/// Validates `options` and fills in every default.
///
/// A relative `output_dir` is resolved against `cwd`. The resolver is the
/// default table for `definitions` merged with the convention preset and the
/// caller's overrides.
pub fn process_config(
    options: &GenOptions,
    definitions: Arc<Definitions>,
    compiler: Arc<dyn SchemaCompiler>,
    cwd: &Path,
) -> Result<Config, GenerationError> {
    options.validate_output()?;

    let output_dir = options.output_dir.clone().unwrap_or_default();
    let output_dir = if output_dir.is_absolute() {
        output_dir
    } else {
        cwd.join(output_dir)
    };

    let axios_file_path = options
        .axios_file_path
        .clone()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_AXIOS_FILE_PATH.to_string());
    let axios_file_path = if Path::new(&axios_file_path).is_absolute() {
        relative_path(&output_dir.join("apis"), Path::new(&axios_file_path))
    } else {
        axios_file_path
    };

    let banner_comment = options
        .banner_comment
        .clone()
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| DEFAULT_BANNER.to_string());

    let resolver = Resolver::defaults(definitions, compiler).merge(options.overrides());

    Ok(Config {
        output_dir,
        axios_file_path,
        request_template: options.request_template.clone(),
        success_response_template: options.success_response_template.clone(),
        banner_comment,
        prettier_config: options.prettier_config.clone(),
        resolver,
    })
}

/// `to` relative to the directory `from`, both absolute, joined with `/`
fn relative_path(from: &Path, to: &Path) -> String {
    let from = normalize(from);
    let to = normalize(to);
    let shared = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); from.len() - shared];
    parts.extend(to[shared..].iter().cloned());
    parts.join("/")
}

fn normalize(path: &Path) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts
}

/// The `gen-request.toml` file read by the `from-config` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub openapi: Option<String>,
    pub output_dir: PathBuf,
    pub axios_file_path: Option<String>,
    pub request_template: Option<String>,
    pub success_response_template: Option<String>,
    pub banner_comment: Option<String>,
    pub prettier_config: Option<PathBuf>,
    pub convention: NamingConvention,
    pub header: bool,
    pub cookie: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            openapi: None,
            output_dir: PathBuf::from("./src/api"),
            axios_file_path: None,
            request_template: None,
            success_response_template: None,
            banner_comment: None,
            prettier_config: None,
            convention: NamingConvention::Controller,
            header: false,
            cookie: false,
        }
    }
}

impl ConfigFile {
    pub const FILE_NAME: &'static str = "gen-request.toml";

    /// Reads and parses the config file at `path`
    pub fn load(path: &Path) -> Result<Self, GenerationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GenerationError::config(format!(
                "cannot read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&content).map_err(|e| match e {
            GenerationError::Config(msg) => {
                GenerationError::config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self, GenerationError> {
        toml::from_str(content).map_err(|e| GenerationError::config(e.to_string()))
    }

    pub fn into_options(self) -> GenOptions {
        GenOptions {
            openapi: self.openapi.as_deref().map(OpenApiSource::parse),
            output_dir: Some(self.output_dir),
            axios_file_path: self.axios_file_path,
            request_template: self.request_template,
            success_response_template: self.success_response_template,
            banner_comment: self.banner_comment,
            prettier_config: self.prettier_config,
            convention: self.convention,
            header: self.header,
            cookie: self.cookie,
            resolver: ResolverOverrides::new(),
        }
    }
}
