//! Core domain types for the generation pipeline

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

/// Named reusable schemas in the flat `#/definitions/...` namespace.
///
/// `self_referential` records every definition whose direct self-reference
/// was neutralized, so renderers can restore the plain name without parsing
/// marker strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    pub schemas: IndexMap<String, JsonValue>,
    pub self_referential: IndexSet<String>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn is_self_referential(&self, name: &str) -> bool {
        self.self_referential.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl From<IndexMap<String, JsonValue>> for Definitions {
    fn from(schemas: IndexMap<String, JsonValue>) -> Self {
        Self {
            schemas,
            self_referential: IndexSet::new(),
        }
    }
}

/// Location of an operation parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// A non-reference OpenAPI parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<JsonValue>,
}

/// The description and schema of one response status code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<JsonValue>,
}

/// One flattened path + method operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Api {
    pub url: String,
    pub method: String,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub params: Vec<Parameter>,
    pub query: Vec<Parameter>,
    pub cookie: Vec<Parameter>,
    pub header: Vec<Parameter>,
    pub body: Option<JsonValue>,
    pub response: IndexMap<String, ResponseSchema>,
}

/// An [`Api`] with every field rendered to an embeddable TypeScript fragment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedApi {
    pub file_name: Option<String>,
    pub url: Option<String>,
    pub method: Option<String>,
    pub fn_name: Option<String>,
    pub fn_comment: Option<String>,
    pub params: Option<String>,
    pub query: Option<String>,
    pub cookie: Option<String>,
    pub header: Option<String>,
    pub body: Option<String>,
    pub response: Option<String>,
}

/// A generated file, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub path: PathBuf,
    pub content: String,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Whether a node is a reference object (carries a `$ref` string)
pub fn is_reference(value: &JsonValue) -> bool {
    value.get("$ref").and_then(JsonValue::as_str).is_some()
}

/// The last path segment of a node's `$ref`, e.g. `UserInfo` for
/// `#/definitions/UserInfo`
pub fn reference_name(value: &JsonValue) -> Option<&str> {
    value
        .get("$ref")
        .and_then(JsonValue::as_str)
        .and_then(|r| r.rsplit('/').next())
}
