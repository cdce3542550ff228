//! Swagger 2.0 to OpenAPI 3.0 upgrade
//!
//! Covers the parts of a Swagger document that affect generated types:
//! definitions, parameters, request bodies (`in: body` and `formData`),
//! responses and their media types. OpenAPI 3.x documents pass through.

use serde_json::{Map, Value as JsonValue, json};

use crate::generation::{DocumentUpgrader, GenerationError};

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

const METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// Keywords that live on a Swagger parameter but belong to its schema in v3
const SCHEMA_KEYWORDS: [&str; 15] = [
    "type",
    "format",
    "items",
    "enum",
    "default",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
];

/// Upgrades Swagger 2.0 documents; OpenAPI 3.x passes through unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct Swagger2Upgrader;

impl Swagger2Upgrader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentUpgrader for Swagger2Upgrader {
    fn upgrade(&self, document: JsonValue) -> Result<JsonValue, GenerationError> {
        if let Some(version) = document.get("openapi").and_then(JsonValue::as_str) {
            if version.starts_with("3.") {
                return Ok(document);
            }
            return Err(upgrade_failed(format!("unsupported openapi version {version}")));
        }

        match document.get("swagger").and_then(JsonValue::as_str) {
            Some("2.0") => {
                let upgraded = Converter::new(&document)?.convert()?;
                tracing::debug!("Upgraded Swagger 2.0 document to OpenAPI 3.0");
                Ok(upgraded)
            }
            Some(version) => Err(upgrade_failed(format!("unsupported swagger version {version}"))),
            None => Err(upgrade_failed("document declares neither `openapi` nor `swagger`")),
        }
    }
}

fn upgrade_failed(reason: impl std::fmt::Display) -> GenerationError {
    GenerationError::conversion(format!("upgrade failed: {reason}"))
}

struct Converter<'a> {
    source: &'a Map<String, JsonValue>,
    consumes: Vec<String>,
    produces: Vec<String>,
}

impl<'a> Converter<'a> {
    fn new(document: &'a JsonValue) -> Result<Self, GenerationError> {
        let source = document
            .as_object()
            .ok_or_else(|| upgrade_failed("document is not an object"))?;
        Ok(Self {
            source,
            consumes: media_types(source.get("consumes")),
            produces: media_types(source.get("produces")),
        })
    }

    fn convert(&self) -> Result<JsonValue, GenerationError> {
        let mut target = Map::new();
        target.insert("openapi".to_string(), json!("3.0.0"));
        target.insert(
            "info".to_string(),
            self.source.get("info").cloned().unwrap_or_else(|| json!({})),
        );
        if let Some(servers) = self.servers() {
            target.insert("servers".to_string(), servers);
        }
        for key in ["tags", "security", "externalDocs"] {
            if let Some(value) = self.source.get(key) {
                target.insert(key.to_string(), value.clone());
            }
        }

        let mut paths = Map::new();
        if let Some(source_paths) = self.source.get("paths").and_then(JsonValue::as_object) {
            for (url, item) in source_paths {
                paths.insert(url.clone(), self.convert_path_item(item)?);
            }
        }
        target.insert("paths".to_string(), JsonValue::Object(paths));
        target.insert("components".to_string(), self.components()?);

        let mut upgraded = JsonValue::Object(target);
        rewrite_refs(&mut upgraded);
        Ok(upgraded)
    }

    fn servers(&self) -> Option<JsonValue> {
        let base_path = self
            .source
            .get("basePath")
            .and_then(JsonValue::as_str)
            .unwrap_or("");
        match self.source.get("host").and_then(JsonValue::as_str) {
            Some(host) => {
                let schemes: Vec<&str> = self
                    .source
                    .get("schemes")
                    .and_then(JsonValue::as_array)
                    .map(|s| s.iter().filter_map(JsonValue::as_str).collect())
                    .filter(|s: &Vec<&str>| !s.is_empty())
                    .unwrap_or_else(|| vec!["https"]);
                Some(JsonValue::Array(
                    schemes
                        .into_iter()
                        .map(|scheme| json!({ "url": format!("{scheme}://{host}{base_path}") }))
                        .collect(),
                ))
            }
            None if !base_path.is_empty() => Some(json!([{ "url": base_path }])),
            None => None,
        }
    }

    fn components(&self) -> Result<JsonValue, GenerationError> {
        let mut components = Map::new();

        if let Some(definitions) = self.source.get("definitions") {
            components.insert("schemas".to_string(), definitions.clone());
        }

        if let Some(parameters) = self.source.get("parameters").and_then(JsonValue::as_object) {
            let mut shared = Map::new();
            let mut bodies = Map::new();
            for (name, param) in parameters {
                if param.get("in").and_then(JsonValue::as_str) == Some("body") {
                    bodies.insert(name.clone(), body_from_parameter(param, &self.consumes));
                } else {
                    shared.insert(name.clone(), convert_parameter(param));
                }
            }
            if !shared.is_empty() {
                components.insert("parameters".to_string(), JsonValue::Object(shared));
            }
            if !bodies.is_empty() {
                components.insert("requestBodies".to_string(), JsonValue::Object(bodies));
            }
        }

        if let Some(responses) = self.source.get("responses").and_then(JsonValue::as_object) {
            let converted = responses
                .iter()
                .map(|(name, response)| (name.clone(), convert_response(response, &self.produces)))
                .collect();
            components.insert("responses".to_string(), JsonValue::Object(converted));
        }

        if let Some(schemes) = self
            .source
            .get("securityDefinitions")
            .and_then(JsonValue::as_object)
        {
            let converted = schemes
                .iter()
                .map(|(name, scheme)| (name.clone(), convert_security_scheme(scheme)))
                .collect();
            components.insert("securitySchemes".to_string(), JsonValue::Object(converted));
        }

        Ok(JsonValue::Object(components))
    }

    fn convert_path_item(&self, item: &JsonValue) -> Result<JsonValue, GenerationError> {
        let item = item
            .as_object()
            .ok_or_else(|| upgrade_failed("path item is not an object"))?;
        let mut converted = Map::new();
        for (key, value) in item {
            if METHODS.contains(&key.as_str()) {
                converted.insert(key.clone(), self.convert_operation(value)?);
            } else if key == "parameters" {
                let params = value
                    .as_array()
                    .map(|params| {
                        params
                            .iter()
                            .filter(|p| p.get("in").and_then(JsonValue::as_str) != Some("body"))
                            .map(|p| self.convert_parameter_or_ref(p))
                            .collect()
                    })
                    .unwrap_or_default();
                converted.insert(key.clone(), JsonValue::Array(params));
            } else {
                converted.insert(key.clone(), value.clone());
            }
        }
        Ok(JsonValue::Object(converted))
    }

    fn convert_operation(&self, operation: &JsonValue) -> Result<JsonValue, GenerationError> {
        let operation = operation
            .as_object()
            .ok_or_else(|| upgrade_failed("operation is not an object"))?;

        let consumes = match operation.get("consumes") {
            Some(own) => media_types(Some(own)),
            None => self.consumes.clone(),
        };
        let produces = match operation.get("produces") {
            Some(own) => media_types(Some(own)),
            None => self.produces.clone(),
        };

        let mut converted = Map::new();
        let mut parameters = Vec::new();
        let mut request_body = None;
        let mut form_fields: Vec<&JsonValue> = Vec::new();

        for (key, value) in operation {
            match key.as_str() {
                "consumes" | "produces" | "schemes" => {}
                "parameters" => {
                    for param in value.as_array().into_iter().flatten() {
                        if let Some(reference) = param.get("$ref").and_then(JsonValue::as_str) {
                            match self.shared_body_name(reference) {
                                Some(name) => {
                                    request_body = Some(json!({
                                        "$ref": format!("#/components/requestBodies/{name}")
                                    }));
                                }
                                None => parameters.push(param.clone()),
                            }
                            continue;
                        }
                        match param.get("in").and_then(JsonValue::as_str) {
                            Some("body") => {
                                request_body = Some(body_from_parameter(param, &consumes))
                            }
                            Some("formData") => form_fields.push(param),
                            _ => parameters.push(convert_parameter(param)),
                        }
                    }
                }
                "responses" => {
                    let responses = value
                        .as_object()
                        .map(|responses| {
                            responses
                                .iter()
                                .map(|(status, response)| {
                                    (status.clone(), convert_response(response, &produces))
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    converted.insert(key.clone(), JsonValue::Object(responses));
                }
                _ => {
                    converted.insert(key.clone(), value.clone());
                }
            }
        }

        if !form_fields.is_empty() && request_body.is_none() {
            request_body = Some(body_from_form(&form_fields, &consumes));
        }
        if !parameters.is_empty() {
            converted.insert("parameters".to_string(), JsonValue::Array(parameters));
        }
        if let Some(body) = request_body {
            converted.insert("requestBody".to_string(), body);
        }
        Ok(JsonValue::Object(converted))
    }

    fn convert_parameter_or_ref(&self, param: &JsonValue) -> JsonValue {
        if param.get("$ref").is_some() {
            param.clone()
        } else {
            convert_parameter(param)
        }
    }

    /// The name of a global body parameter a `#/parameters/...` ref points at
    fn shared_body_name(&self, reference: &str) -> Option<String> {
        let name = reference.strip_prefix("#/parameters/")?;
        let param = self.source.get("parameters")?.get(name)?;
        (param.get("in").and_then(JsonValue::as_str) == Some("body")).then(|| name.to_string())
    }
}

fn media_types(value: Option<&JsonValue>) -> Vec<String> {
    let types: Vec<String> = value
        .and_then(JsonValue::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(JsonValue::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    if types.is_empty() {
        vec![DEFAULT_MEDIA_TYPE.to_string()]
    } else {
        types
    }
}

fn content_for(media_types: &[String], schema: &JsonValue) -> JsonValue {
    let content: Map<String, JsonValue> = media_types
        .iter()
        .map(|media| (media.clone(), json!({ "schema": schema })))
        .collect();
    JsonValue::Object(content)
}

/// Moves the schema keywords of a non-body Swagger parameter under `schema`
fn convert_parameter(param: &JsonValue) -> JsonValue {
    let Some(fields) = param.as_object() else {
        return param.clone();
    };
    if fields.contains_key("schema") {
        return param.clone();
    }

    let mut converted = Map::new();
    let mut schema = Map::new();
    for (key, value) in fields {
        if SCHEMA_KEYWORDS.contains(&key.as_str()) {
            schema.insert(key.clone(), convert_schema_type(key, value));
        } else if key != "collectionFormat" && key != "allowEmptyValue" {
            converted.insert(key.clone(), value.clone());
        }
    }
    if !schema.is_empty() {
        converted.insert("schema".to_string(), JsonValue::Object(schema));
    }
    JsonValue::Object(converted)
}

fn convert_schema_type(key: &str, value: &JsonValue) -> JsonValue {
    if key == "type" && value.as_str() == Some("file") {
        json!("string")
    } else {
        value.clone()
    }
}

fn body_from_parameter(param: &JsonValue, consumes: &[String]) -> JsonValue {
    let schema = param.get("schema").cloned().unwrap_or_else(|| json!({}));
    let mut body = Map::new();
    if let Some(description) = param.get("description") {
        body.insert("description".to_string(), description.clone());
    }
    body.insert("content".to_string(), content_for(consumes, &schema));
    if let Some(required) = param.get("required") {
        body.insert("required".to_string(), required.clone());
    }
    JsonValue::Object(body)
}

fn body_from_form(fields: &[&JsonValue], consumes: &[String]) -> JsonValue {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut has_file = false;

    for field in fields {
        let Some(name) = field.get("name").and_then(JsonValue::as_str) else {
            continue;
        };
        let mut property = match convert_parameter(field).get("schema") {
            Some(JsonValue::Object(schema)) => schema.clone(),
            _ => Map::new(),
        };
        if field.get("type").and_then(JsonValue::as_str) == Some("file") {
            has_file = true;
            property.insert("format".to_string(), json!("binary"));
        }
        if let Some(description) = field.get("description") {
            property.insert("description".to_string(), description.clone());
        }
        if field.get("required").and_then(JsonValue::as_bool) == Some(true) {
            required.push(json!(name));
        }
        properties.insert(name.to_string(), JsonValue::Object(property));
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), JsonValue::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), JsonValue::Array(required));
    }

    let media = if has_file || consumes.iter().any(|c| c == MULTIPART) {
        MULTIPART
    } else {
        FORM_URLENCODED
    };
    json!({ "content": content_for(&[media.to_string()], &JsonValue::Object(schema)) })
}

fn convert_response(response: &JsonValue, produces: &[String]) -> JsonValue {
    let Some(fields) = response.as_object() else {
        return response.clone();
    };
    if fields.contains_key("$ref") {
        return response.clone();
    }

    let mut converted = Map::new();
    converted.insert(
        "description".to_string(),
        fields.get("description").cloned().unwrap_or_else(|| json!("")),
    );
    if let Some(schema) = fields.get("schema") {
        converted.insert("content".to_string(), content_for(produces, schema));
    }
    if let Some(headers) = fields.get("headers").and_then(JsonValue::as_object) {
        let headers = headers
            .iter()
            .map(|(name, header)| {
                let mut header = convert_parameter(header);
                if let Some(obj) = header.as_object_mut() {
                    obj.remove("name");
                    obj.remove("in");
                }
                (name.clone(), header)
            })
            .collect();
        converted.insert("headers".to_string(), JsonValue::Object(headers));
    }
    JsonValue::Object(converted)
}

fn convert_security_scheme(scheme: &JsonValue) -> JsonValue {
    match scheme.get("type").and_then(JsonValue::as_str) {
        Some("basic") => json!({ "type": "http", "scheme": "basic" }),
        _ => scheme.clone(),
    }
}

/// Points Swagger-style refs at their v3 component locations
fn rewrite_refs(node: &mut JsonValue) {
    match node {
        JsonValue::Object(fields) => {
            for (key, value) in fields.iter_mut() {
                if key == "$ref" {
                    if let JsonValue::String(reference) = value {
                        *reference = rewrite_ref(reference);
                    }
                } else {
                    rewrite_refs(value);
                }
            }
        }
        JsonValue::Array(items) => items.iter_mut().for_each(rewrite_refs),
        _ => {}
    }
}

fn rewrite_ref(reference: &str) -> String {
    for (from, to) in [
        ("#/definitions/", "#/components/schemas/"),
        ("#/parameters/", "#/components/parameters/"),
        ("#/responses/", "#/components/responses/"),
    ] {
        if let Some(rest) = reference.strip_prefix(from) {
            return format!("{to}{rest}");
        }
    }
    reference.to_string()
}
