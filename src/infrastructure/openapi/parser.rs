//! Operation extraction
//!
//! Flattens the `paths` object of a normalized OpenAPI v3 document into one
//! [`Api`] per path and HTTP method, in document order.

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::str::FromStr;

use crate::generation::types::{Api, Parameter, ParameterLocation, ResponseSchema, is_reference};

/// HTTP methods an OpenAPI path item may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(HttpMethod::Get),
            "put" => Ok(HttpMethod::Put),
            "post" => Ok(HttpMethod::Post),
            "delete" => Ok(HttpMethod::Delete),
            "options" => Ok(HttpMethod::Options),
            "head" => Ok(HttpMethod::Head),
            "patch" => Ok(HttpMethod::Patch),
            "trace" => Ok(HttpMethod::Trace),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracts [`Api`] records from a document
#[derive(Debug, Default, Clone, Copy)]
pub struct ApiExtractor;

impl ApiExtractor {
    pub fn new() -> Self {
        Self
    }

    /// One Api per path × method. Non-method keys of a path item (`summary`,
    /// `parameters`, `servers`, extensions) are skipped.
    pub fn extract(&self, document: &JsonValue) -> Vec<Api> {
        let Some(paths) = document.get("paths").and_then(JsonValue::as_object) else {
            tracing::debug!("Document has no paths");
            return Vec::new();
        };

        let apis: Vec<Api> = paths
            .iter()
            .flat_map(|(url, path_item)| {
                let shared = path_item.get("parameters");
                path_item
                    .as_object()
                    .into_iter()
                    .flat_map(|item| item.iter())
                    .filter_map(|(key, operation)| {
                        let method = key.parse::<HttpMethod>().ok()?;
                        let operation = operation.as_object()?;
                        Some(self.build_api(url, method, shared, operation))
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        tracing::debug!("Extracted {} operations", apis.len());
        apis
    }

    fn build_api(
        &self,
        url: &str,
        method: HttpMethod,
        shared_parameters: Option<&JsonValue>,
        operation: &Map<String, JsonValue>,
    ) -> Api {
        let text = |key: &str| {
            operation
                .get(key)
                .and_then(JsonValue::as_str)
                .map(String::from)
        };

        let tags = operation.get("tags").and_then(JsonValue::as_array).map(|tags| {
            tags.iter()
                .filter_map(JsonValue::as_str)
                .map(String::from)
                .collect()
        });

        let parameters = merge_parameters(
            extract_parameters(url, method, shared_parameters),
            extract_parameters(url, method, operation.get("parameters")),
        );
        let in_location = |location: ParameterLocation| {
            parameters
                .iter()
                .filter(|p| p.location == location)
                .cloned()
                .collect::<Vec<_>>()
        };

        Api {
            url: url.to_string(),
            method: method.to_string(),
            description: text("description"),
            operation_id: text("operationId"),
            summary: text("summary"),
            tags,
            params: in_location(ParameterLocation::Path),
            query: in_location(ParameterLocation::Query),
            cookie: in_location(ParameterLocation::Cookie),
            header: in_location(ParameterLocation::Header),
            body: operation.get("requestBody").and_then(extract_body),
            response: extract_responses(operation.get("responses")),
        }
    }
}

/// Non-reference parameters, in declaration order. Reference parameters and
/// malformed entries are dropped.
fn extract_parameters(
    url: &str,
    method: HttpMethod,
    parameters: Option<&JsonValue>,
) -> Vec<Parameter> {
    let Some(parameters) = parameters.and_then(JsonValue::as_array) else {
        return Vec::new();
    };

    parameters
        .iter()
        .filter_map(|param| {
            if is_reference(param) {
                tracing::warn!(%url, %method, "Dropping unresolved parameter reference");
                return None;
            }
            match serde_json::from_value::<Parameter>(param.clone()) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!(%url, %method, error = %e, "Dropping invalid parameter");
                    None
                }
            }
        })
        .collect()
}

/// Path-item parameters followed by operation parameters; an operation
/// parameter replaces a path-item parameter with the same name and location.
fn merge_parameters(shared: Vec<Parameter>, own: Vec<Parameter>) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = shared
        .into_iter()
        .filter(|s| !own.iter().any(|o| o.name == s.name && o.location == s.location))
        .collect();
    merged.extend(own);
    merged
}

fn extract_body(request_body: &JsonValue) -> Option<JsonValue> {
    if is_reference(request_body) {
        return Some(request_body.clone());
    }
    first_content_schema(request_body)
}

fn extract_responses(responses: Option<&JsonValue>) -> IndexMap<String, ResponseSchema> {
    let Some(responses) = responses.and_then(JsonValue::as_object) else {
        return IndexMap::new();
    };

    responses
        .iter()
        .map(|(status, response)| {
            let schema = if is_reference(response) {
                ResponseSchema {
                    description: None,
                    schema: Some(response.clone()),
                }
            } else {
                ResponseSchema {
                    description: response
                        .get("description")
                        .and_then(JsonValue::as_str)
                        .map(String::from),
                    schema: first_content_schema(response),
                }
            };
            (status.clone(), schema)
        })
        .collect()
}

/// The schema of the first media type under `content`
fn first_content_schema(holder: &JsonValue) -> Option<JsonValue> {
    holder
        .get("content")
        .and_then(JsonValue::as_object)
        .and_then(|content| content.values().next())
        .and_then(|media| media.get("schema"))
        .cloned()
}
