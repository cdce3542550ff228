//! Reference normalization
//!
//! OpenAPI keeps reusable shapes under `#/components/schemas` and
//! `#/components/requestBodies`; the schema compiler only understands the
//! JSON-Schema `#/definitions` namespace. Namespaced identifiers such as
//! `inner_log.AttributeChange.OpType` are also folded into a single PascalCase
//! identifier, both where they are declared (object keys) and where they are
//! referenced (`$ref` paths).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value as JsonValue};

use crate::generation::utils::dotted_to_pascal_case;

static COMPONENT_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"components/(schemas|requestBodies)").expect("component path pattern")
});

static DOTTED_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9_]+\.)+[A-Za-z0-9_]+$").expect("dotted key pattern")
});

static DOTTED_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"definitions/((?:[A-Za-z0-9_]+\.)+[A-Za-z0-9_]+)").expect("dotted ref pattern")
});

/// Returns a copy of `document` with every component reference moved into the
/// `definitions` namespace and every dotted identifier PascalCased.
///
/// The rewrite applies to every string in the tree, keys included, so
/// applying it twice yields the same document as applying it once.
pub fn normalize_refs(document: &JsonValue) -> JsonValue {
    match document {
        JsonValue::Object(map) => {
            let mut rewritten = Map::with_capacity(map.len());
            for (key, value) in map {
                let value = normalize_refs(value);
                let mut key = rewrite_path(key);
                if value.is_object() && DOTTED_KEY.is_match(&key) {
                    key = dotted_to_pascal_case(&key);
                }
                rewritten.insert(key, value);
            }
            JsonValue::Object(rewritten)
        }
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(normalize_refs).collect()),
        JsonValue::String(s) => JsonValue::String(rewrite_path(s)),
        other => other.clone(),
    }
}

fn rewrite_path(s: &str) -> String {
    let moved = COMPONENT_PATH.replace_all(s, "definitions");
    DOTTED_DEFINITION
        .replace_all(&moved, |caps: &Captures| {
            format!("definitions/{}", dotted_to_pascal_case(&caps[1]))
        })
        .into_owned()
}
