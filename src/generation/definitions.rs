//! Definition collection and self-cycle breaking
//!
//! The schema compiler cannot follow a schema that refers back to itself, so
//! every collected definition is rewritten before it is ever compiled: a
//! `$ref` to the definition's own name becomes an `any` node carrying
//! [`SELF_REFERENCE_SUFFIX`] in its title. Only direct self-references are
//! broken; a cycle running through two different definitions is left alone.

use indexmap::IndexMap;
use serde_json::{Value as JsonValue, json};

use crate::generation::types::{Definitions, is_reference};

/// Appended to a definition name to mark a neutralized self-reference.
pub const SELF_REFERENCE_SUFFIX: &str = "_____OpenapiGenRequestAnyToReplace";

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Collects the flat definition namespace from a normalized document.
///
/// Inline JSON request bodies are folded in first (carrying the request
/// body's own `description`), then `components.schemas` are layered on top,
/// so a schema wins over a request body of the same name. Request bodies whose
/// JSON schema is itself a reference contribute nothing.
pub fn collect_definitions(document: &JsonValue) -> Definitions {
    let components = document.get("components");

    let mut schemas: IndexMap<String, JsonValue> = IndexMap::new();

    if let Some(request_bodies) = components
        .and_then(|c| c.get("requestBodies"))
        .and_then(JsonValue::as_object)
        .filter(|bodies| !bodies.contains_key("$ref"))
    {
        for (name, body) in request_bodies {
            let Some(schema) = body.pointer("/content/application~1json/schema") else {
                continue;
            };
            if is_reference(schema) || !schema.is_object() {
                continue;
            }
            let mut flattened = schema.clone();
            if let Some(obj) = flattened.as_object_mut() {
                let description = body.get("description").cloned().unwrap_or(JsonValue::Null);
                if description.is_null() {
                    obj.remove("description");
                } else {
                    obj.insert("description".to_string(), description);
                }
            }
            schemas.insert(name.clone(), flattened);
        }
    }

    if let Some(component_schemas) = components
        .and_then(|c| c.get("schemas"))
        .and_then(JsonValue::as_object)
        .filter(|s| !s.contains_key("$ref"))
    {
        for (name, schema) in component_schemas {
            schemas.insert(name.clone(), schema.clone());
        }
    }

    let mut definitions = Definitions::from(schemas);
    let names: Vec<String> = definitions.schemas.keys().cloned().collect();
    for name in names {
        let broken = definitions
            .schemas
            .get_mut(&name)
            .map(|schema| break_circular_refs(schema, &name))
            .unwrap_or(0);
        if broken > 0 {
            tracing::debug!(definition = %name, broken, "Neutralized self references");
            definitions.self_referential.insert(name);
        }
    }

    tracing::debug!("Collected {} definitions", definitions.len());
    definitions
}

/// Replaces every reference to `own_name` inside `node` with an `any`
/// placeholder and returns how many were replaced.
pub fn break_circular_refs(node: &mut JsonValue, own_name: &str) -> usize {
    if !node.is_object() {
        return 0;
    }

    let target = node
        .get("$ref")
        .and_then(JsonValue::as_str)
        .map(|r| r.strip_prefix(DEFINITIONS_PREFIX).unwrap_or(r) == own_name)
        .unwrap_or(false);
    if target {
        if let Some(obj) = node.as_object_mut() {
            obj.remove("$ref");
            obj.insert("type".to_string(), json!("any"));
            obj.insert(
                "title".to_string(),
                json!(format!("{own_name}{SELF_REFERENCE_SUFFIX}")),
            );
        }
        return 1;
    }

    let kind = node
        .get("type")
        .and_then(JsonValue::as_str)
        .map(str::to_owned);
    match kind.as_deref() {
        Some("object") => node
            .get_mut("properties")
            .and_then(JsonValue::as_object_mut)
            .map(|props| {
                props
                    .values_mut()
                    .map(|child| break_circular_refs(child, own_name))
                    .sum()
            })
            .unwrap_or(0),
        Some("array") => match node.get_mut("items") {
            Some(JsonValue::Array(items)) => items
                .iter_mut()
                .map(|item| break_circular_refs(item, own_name))
                .sum(),
            Some(items) => break_circular_refs(items, own_name),
            None => 0,
        },
        _ => {
            let combinator = ["allOf", "anyOf", "oneOf"]
                .into_iter()
                .find(|key| node.get(*key).is_some_and(JsonValue::is_array));
            let mut broken = 0;
            if let Some(key) = combinator {
                if let Some(JsonValue::Array(members)) = node.get_mut(key) {
                    broken += members
                        .iter_mut()
                        .map(|member| break_circular_refs(member, own_name))
                        .sum::<usize>();
                }
            }
            if let Some(not) = node.get_mut("not") {
                broken += break_circular_refs(not, own_name);
            }
            broken
        }
    }
}
