//! JSON-Schema to TypeScript declaration compiler
//!
//! Produces unformatted output in the shape json-schema-to-typescript emits:
//! the root declaration first, followed by one `export` declaration for every
//! titled sub-schema and every referenced definition it pulled in.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;

use crate::generation::definitions::SELF_REFERENCE_SUFFIX;
use crate::generation::utils::{is_valid_identifier, to_safe_identifier};
use crate::generation::{Definitions, GenerationError, SchemaCompiler};

const DEFINITIONS_PREFIX: &str = "#/definitions/";
const ANY: &str = "any";

/// Built-in [`SchemaCompiler`]
#[derive(Debug, Clone, Default)]
pub struct TypeScriptCompiler;

impl TypeScriptCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaCompiler for TypeScriptCompiler {
    fn compile(
        &self,
        schema: &JsonValue,
        name: &str,
        definitions: &Definitions,
    ) -> Result<String, GenerationError> {
        let root_name = to_safe_identifier(name);
        let mut emitter = Emitter::new(definitions, &root_name);
        emitter.declared.insert(root_name.clone(), schema);
        emitter.declare(&root_name, schema)?;
        while let Some((pending_name, pending_schema)) = emitter.pending.pop_front() {
            emitter.declare(&pending_name, pending_schema)?;
        }
        Ok(emitter.output)
    }
}

struct Emitter<'a> {
    definitions: &'a Definitions,
    root_name: &'a str,
    /// Declaration name to the schema it was claimed by
    declared: IndexMap<String, &'a JsonValue>,
    pending: VecDeque<(String, &'a JsonValue)>,
    output: String,
}

impl<'a> Emitter<'a> {
    fn new(definitions: &'a Definitions, root_name: &'a str) -> Self {
        Self {
            definitions,
            root_name,
            declared: IndexMap::new(),
            pending: VecDeque::new(),
            output: String::new(),
        }
    }

    fn declare(&mut self, name: &str, schema: &'a JsonValue) -> Result<(), GenerationError> {
        if let Some(description) = description_of(schema) {
            self.output.push_str(&doc_comment(description));
        }
        if is_interface(schema) {
            let body = self.object_body(name, schema)?;
            self.output.push_str(&format!("export interface {name} {body}\n"));
        } else {
            let expr = self.type_body(name, schema)?;
            self.output.push_str(&format!("export type {name} = {expr}\n"));
        }
        Ok(())
    }

    /// Type expression for a nested schema, hoisting titled schemas into
    /// their own declarations.
    fn type_expr(
        &mut self,
        context: &str,
        schema: &'a JsonValue,
    ) -> Result<String, GenerationError> {
        if let Some(title) = schema
            .get("title")
            .and_then(JsonValue::as_str)
            .filter(|t| !t.is_empty())
        {
            if let Some(own) = title.strip_suffix(SELF_REFERENCE_SUFFIX) {
                if self.definitions.is_self_referential(own) {
                    return Ok(to_safe_identifier(own));
                }
            }
            return Ok(self.claim_title(to_safe_identifier(title), schema));
        }
        self.type_body(context, schema)
    }

    /// Name for a hoisted titled schema. A name already held by a different
    /// schema, or by a different definition, gets a numeric suffix.
    fn claim_title(&mut self, base: String, schema: &'a JsonValue) -> String {
        let mut candidate = base.clone();
        let mut suffix = 0;
        loop {
            let taken = match self.declared.get(&candidate) {
                Some(existing) => *existing != schema,
                None => self
                    .definitions
                    .get(&candidate)
                    .is_some_and(|definition| definition != schema),
            };
            if !taken {
                break;
            }
            suffix += 1;
            candidate = format!("{base}{suffix}");
        }
        if !self.declared.contains_key(&candidate) {
            self.declared.insert(candidate.clone(), schema);
            self.pending.push_back((candidate.clone(), schema));
        }
        candidate
    }

    /// Type expression for a schema without considering its title.
    fn type_body(
        &mut self,
        context: &str,
        schema: &'a JsonValue,
    ) -> Result<String, GenerationError> {
        let fields = match schema {
            JsonValue::Object(fields) => fields,
            JsonValue::Bool(false) => return Ok("never".to_string()),
            _ => return Ok(ANY.to_string()),
        };

        if let Some(reference) = fields.get("$ref") {
            let reference = reference.as_str().ok_or_else(|| {
                GenerationError::compile(context, "`$ref` must be a string")
            })?;
            return Ok(self.reference(reference));
        }

        for (keyword, separator) in [("allOf", " & "), ("anyOf", " | "), ("oneOf", " | ")] {
            if let Some(members) = fields.get(keyword) {
                let members = members.as_array().ok_or_else(|| {
                    GenerationError::compile(context, format!("`{keyword}` must be an array"))
                })?;
                let parts = members
                    .iter()
                    .map(|member| self.type_expr(context, member).map(|t| parenthesize(&t)))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(if parts.is_empty() {
                    ANY.to_string()
                } else {
                    parts.join(separator)
                });
            }
        }

        if let Some(values) = fields.get("enum").and_then(JsonValue::as_array) {
            return Ok(values.iter().map(literal).collect::<Vec<_>>().join(" | "));
        }

        if let Some(value) = fields.get("const") {
            return Ok(literal(value));
        }

        match fields.get("type") {
            Some(JsonValue::String(kind)) => self.typed(context, kind, schema),
            Some(JsonValue::Array(kinds)) => {
                let parts = kinds
                    .iter()
                    .map(|kind| {
                        kind.as_str()
                            .ok_or_else(|| {
                                GenerationError::compile(context, "`type` entries must be strings")
                            })
                            .and_then(|kind| self.typed(context, kind, schema))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(parts.join(" | "))
            }
            Some(other) => Err(GenerationError::compile(
                context,
                format!("unsupported `type` value {other}"),
            )),
            None if is_object_shaped(schema) => self.object_body(context, schema),
            None if fields.contains_key("items") => self.array(context, schema),
            None => Ok(ANY.to_string()),
        }
    }

    fn typed(
        &mut self,
        context: &str,
        kind: &str,
        schema: &'a JsonValue,
    ) -> Result<String, GenerationError> {
        Ok(match kind {
            "string" => "string".to_string(),
            "number" | "integer" => "number".to_string(),
            "boolean" => "boolean".to_string(),
            "null" => "null".to_string(),
            "array" => self.array(context, schema)?,
            "object" => self.object_body(context, schema)?,
            _ => ANY.to_string(),
        })
    }

    fn array(&mut self, context: &str, schema: &'a JsonValue) -> Result<String, GenerationError> {
        match schema.get("items") {
            Some(JsonValue::Array(items)) => {
                let members = items
                    .iter()
                    .map(|item| self.type_expr(context, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("[{}]", members.join(", ")))
            }
            Some(items) => {
                let element = self.type_expr(context, items)?;
                Ok(format!("{}[]", parenthesize(&element)))
            }
            None => Ok(format!("{}[]", ANY)),
        }
    }

    fn object_body(
        &mut self,
        context: &str,
        schema: &'a JsonValue,
    ) -> Result<String, GenerationError> {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(JsonValue::as_array)
            .map(|names| names.iter().filter_map(JsonValue::as_str).collect())
            .unwrap_or_default();

        let mut members = String::new();
        if let Some(properties) = schema.get("properties").and_then(JsonValue::as_object) {
            for (key, property) in properties {
                if let Some(description) = description_of(property) {
                    members.push_str(&doc_comment(description));
                }
                let optional = if required.contains(&key.as_str()) { "" } else { "?" };
                let property_type = self.type_expr(context, property)?;
                members.push_str(&format!(
                    "{}{optional}: {property_type}\n",
                    property_key(key)
                ));
            }
        }

        match schema.get("additionalProperties") {
            Some(JsonValue::Bool(false)) => {}
            None | Some(JsonValue::Bool(true)) => {
                members.push_str(&format!("[k: string]: {}\n", ANY));
            }
            Some(additional) => {
                let value_type = self.type_expr(context, additional)?;
                members.push_str(&format!("[k: string]: {value_type}\n"));
            }
        }

        Ok(if members.is_empty() {
            "{}".to_string()
        } else {
            format!("{{\n{members}}}")
        })
    }

    fn reference(&mut self, reference: &str) -> String {
        if reference == "#" {
            return self.root_name.to_string();
        }
        let target = reference.rsplit('/').next().unwrap_or(reference);
        let named = to_safe_identifier(target);
        let definition = reference
            .strip_prefix(DEFINITIONS_PREFIX)
            .and_then(|key| self.definitions.get(key));
        match definition {
            Some(schema) => {
                if !self.declared.contains_key(&named) {
                    self.declared.insert(named.clone(), schema);
                    self.pending.push_back((named.clone(), schema));
                }
            }
            None => {
                tracing::warn!(
                    reference = %reference,
                    "Reference does not resolve to a known definition"
                );
            }
        }
        named
    }
}

fn is_object_shaped(schema: &JsonValue) -> bool {
    schema.get("properties").is_some() || schema.get("additionalProperties").is_some()
}

fn is_interface(schema: &JsonValue) -> bool {
    let Some(fields) = schema.as_object() else {
        return false;
    };
    let composite = ["$ref", "allOf", "anyOf", "oneOf", "enum", "const"]
        .iter()
        .any(|key| fields.contains_key(*key));
    if composite {
        return false;
    }
    match fields.get("type") {
        Some(JsonValue::String(kind)) => kind == "object",
        None => is_object_shaped(schema),
        Some(_) => false,
    }
}

fn description_of(schema: &JsonValue) -> Option<&str> {
    schema
        .get("description")
        .and_then(JsonValue::as_str)
        .filter(|d| !d.is_empty())
}

fn doc_comment(text: &str) -> String {
    let lines: Vec<String> = text.split('\n').map(|line| format!(" * {line}")).collect();
    format!("/**\n{}\n */\n", lines.join("\n"))
}

fn property_key(key: &str) -> String {
    if is_valid_identifier(key) {
        key.to_string()
    } else {
        JsonValue::String(key.to_string()).to_string()
    }
}

fn literal(value: &JsonValue) -> String {
    match value {
        JsonValue::Object(_) | JsonValue::Array(_) => "any".to_string(),
        other => other.to_string(),
    }
}

/// Wraps compound expressions so they bind correctly inside `[]`, `&` and `|`.
fn parenthesize(expr: &str) -> String {
    let compound = expr.contains(" | ") || expr.contains(" & ");
    let wrapped = expr.starts_with('(') && expr.ends_with(')');
    if compound && !wrapped && !expr.starts_with('{') {
        format!("({expr})")
    } else {
        expr.to_string()
    }
}
