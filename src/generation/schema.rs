//! Schema to TypeScript conversion
//!
//! Turns JSON-Schema fragments into either standalone `export` declarations
//! or inline `name: Type` parameter fragments, delegating the general case to
//! a [`SchemaCompiler`].

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde_json::{Map, Value as JsonValue, json};

use crate::generation::definitions::SELF_REFERENCE_SUFFIX;
use crate::generation::types::{Definitions, Parameter, is_reference, reference_name};
use crate::generation::utils::to_pascal_case;
use crate::generation::{GenerationError, SchemaCompiler};

static SELF_REFERENCE_ALIAS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "export type .+{} = any\n",
        regex::escape(SELF_REFERENCE_SUFFIX)
    ))
    .expect("self reference alias pattern")
});

static SELF_REFERENCE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&regex::escape(SELF_REFERENCE_SUFFIX)).expect("self reference marker pattern")
});

static DECLARATION_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"export (type|interface) (\w+) = ").expect("declaration pattern"));

/// Compiles `schema` and scrubs any placeholder left behind by a broken
/// self-reference, restoring the plain self-referential type name.
pub fn compile_schema(
    compiler: &dyn SchemaCompiler,
    schema: &JsonValue,
    name: &str,
    definitions: &Definitions,
) -> Result<String, GenerationError> {
    let compiled = compiler.compile(schema, name, definitions)?;
    let without_alias = SELF_REFERENCE_ALIAS.replace_all(&compiled, "");
    Ok(SELF_REFERENCE_MARKER
        .replace_all(&without_alias, "")
        .into_owned())
}

/// Flattens an OpenAPI parameter- or response-shaped object, whose real
/// schema lives under a nested `schema` key, into a plain JSON-Schema node.
///
/// - array-typed input is returned unchanged
/// - without a nested `schema` the remaining fields are returned under `id`
/// - a nested reference is hoisted
/// - a nested array or object schema is merged onto the result
/// - any other nested schema becomes the `properties` of the result
pub fn change_openapi_to_json_schema(openapi_schema: &JsonValue, name: &str) -> Option<JsonValue> {
    let fields = match openapi_schema {
        JsonValue::Null => return None,
        JsonValue::Object(fields) => fields,
        other => return Some(other.clone()),
    };

    if fields.get("type").and_then(JsonValue::as_str) == Some("array") {
        return Some(openapi_schema.clone());
    }

    let mut result = Map::new();
    result.insert("id".to_string(), json!(name));
    for (key, value) in fields.iter().filter(|(key, _)| key.as_str() != "schema") {
        result.insert(key.clone(), value.clone());
    }

    let schema = match fields.get("schema") {
        None | Some(JsonValue::Null) => return Some(JsonValue::Object(result)),
        Some(schema) => schema,
    };

    if let Some(reference) = schema.get("$ref") {
        if reference.is_string() {
            result.insert("$ref".to_string(), reference.clone());
        }
    } else if matches!(
        schema.get("type").and_then(JsonValue::as_str),
        Some("array") | Some("object")
    ) {
        if let Some(nested) = schema.as_object() {
            for (key, value) in nested {
                result.insert(key.clone(), value.clone());
            }
        }
    } else {
        result.insert("properties".to_string(), schema.clone());
    }

    Some(JsonValue::Object(result))
}

/// Renders `schema` as a standalone declaration named `name`.
///
/// Arrays become a `<Name>Item` alias plus `export type <Name> = <Name>Item[]`;
/// bare references become an alias into the shared `Types` namespace;
/// everything else goes through the compiler.
pub fn schema_to_ts(
    compiler: &dyn SchemaCompiler,
    schema: Option<&JsonValue>,
    name: &str,
    definitions: &Definitions,
) -> Result<Option<String>, GenerationError> {
    let Some(schema) = schema.filter(|s| !s.is_null()) else {
        return Ok(None);
    };

    if schema.get("type").and_then(JsonValue::as_str) == Some("array") {
        let item = process_array_schema(compiler, schema, name, definitions)?;
        let comment = description_of(schema)
            .map(|d| format!("/** {d} */"))
            .unwrap_or_default();
        return Ok(Some(
            [
                item.declaration,
                comment,
                format!("export type {name} = {}[]", item.item_name),
            ]
            .join("\n"),
        ));
    }

    if let Some(type_name) = reference_name(schema) {
        let comment = description_of(schema)
            .map(|d| format!("/** {d} */\n"))
            .unwrap_or_default();
        return Ok(Some(format!(
            "{comment}export type {name} = Types.{type_name}"
        )));
    }

    compile_schema(compiler, schema, name, definitions).map(Some)
}

/// Renders one path parameter as an inline `name: Type` / `name?: Type`
/// fragment for a function signature.
pub fn schema_to_inline_ts(
    compiler: &dyn SchemaCompiler,
    param: &Parameter,
    definitions: &Definitions,
) -> Result<String, GenerationError> {
    let empty = json!({});
    let schema = param.schema.as_ref().unwrap_or(&empty);
    let id = schema
        .get("title")
        .and_then(JsonValue::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or(param.name.as_str());
    let optional = if param.required { "" } else { "?" };

    if schema.get("type").and_then(JsonValue::as_str) == Some("array") {
        let items = schema.get("items").unwrap_or(&empty);
        let type_name = match reference_name(items) {
            Some(name) => name.to_string(),
            None => primitive_ts_type(items.get("type").and_then(JsonValue::as_str)).to_string(),
        };
        return Ok(format!("{id}{optional}: {type_name}[]"));
    }

    if let Some(type_name) = reference_name(schema) {
        return Ok(format!("{id}{optional}: {type_name}"));
    }

    let mut inline = schema.clone();
    if let Some(obj) = inline.as_object_mut() {
        obj.remove("description");
    }
    let compiled = compile_schema(compiler, &inline, id, definitions)?;
    let head = format!("{id}{optional}: ");
    let replaced = DECLARATION_HEAD.replace(&compiled, NoExpand(&head));
    let trimmed = replaced.trim();
    Ok(trimmed.strip_suffix(';').unwrap_or(trimmed).to_string())
}

/// Renders a list of same-location parameters as a single object
/// declaration named `name` (`Query`, `Header`, `Cookie`).
pub fn parameters_to_ts(
    compiler: &dyn SchemaCompiler,
    params: &[Parameter],
    name: &str,
    definitions: &Definitions,
) -> Result<Option<String>, GenerationError> {
    if params.is_empty() {
        return Ok(None);
    }

    let mut properties = Map::new();
    for param in params {
        let mut property = match &param.schema {
            Some(JsonValue::Object(fields)) => fields.clone(),
            _ => Map::new(),
        };
        match &param.description {
            Some(description) => {
                property.insert("description".to_string(), json!(description));
            }
            None => {
                property.remove("description");
            }
        }
        properties.insert(param.name.clone(), JsonValue::Object(property));
    }

    let required: Vec<&str> = params
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();

    let schema = json!({
        "title": name,
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    });
    compile_schema(compiler, &schema, name, definitions).map(Some)
}

struct ArrayItem {
    item_name: String,
    declaration: String,
}

fn process_array_schema(
    compiler: &dyn SchemaCompiler,
    array_schema: &JsonValue,
    name: &str,
    definitions: &Definitions,
) -> Result<ArrayItem, GenerationError> {
    let item_name = to_pascal_case(&format!("{name}Item"));
    let empty = json!({});
    let items = array_schema.get("items").unwrap_or(&empty);

    let declaration = if is_reference(items) {
        let type_name = reference_name(items).unwrap_or_default();
        format!("export type {item_name} = Types.{type_name}")
    } else {
        compile_schema(compiler, items, &item_name, definitions)?
    };

    Ok(ArrayItem {
        item_name,
        declaration,
    })
}

fn description_of(schema: &JsonValue) -> Option<&str> {
    schema
        .get("description")
        .and_then(JsonValue::as_str)
        .filter(|d| !d.is_empty())
}

fn primitive_ts_type(kind: Option<&str>) -> &'static str {
    match kind {
        Some("integer") | Some("number") => "number",
        Some("string") => "string",
        Some("boolean") => "boolean",
        Some("null") => "null",
        Some("object") => "object",
        _ => "any",
    }
}
