//! Recursive structural intersection of a value with a template.

use serde_json::{Map, Value};

use super::error::{Result, SchemaError};
use super::template::AttributeTemplate;

const ROOT: &str = "<root>";

/// Returns a copy of `data` holding only what `template` allows.
///
/// Mapping nodes keep the keys that exist in both the template and the data,
/// sequence nodes filter every element against the element shape, and
/// scalar nodes keep strings, booleans and numbers unchanged. Any other
/// combination is a [`SchemaError::ShapeMismatch`]; no partial result is
/// returned in that case. `data` itself is never modified.
pub fn filter(template: &AttributeTemplate, data: &Value) -> Result<Value> {
    filter_at(template, data, ROOT)
}

/// [`filter`] for a top-level mapping, as returned by DescribeTable.
pub fn filter_object(
    template: &AttributeTemplate,
    data: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    filter_map(template, data, ROOT)
}

fn filter_at(template: &AttributeTemplate, data: &Value, path: &str) -> Result<Value> {
    match (template, data) {
        (AttributeTemplate::Map(_), Value::Object(fields)) => {
            Ok(Value::Object(filter_map(template, fields, path)?))
        }
        (AttributeTemplate::List(element), Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| filter_at(element, item, &index_path(path, i)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        (AttributeTemplate::Scalar, Value::String(_) | Value::Bool(_) | Value::Number(_)) => {
            Ok(data.clone())
        }
        (template, data) => Err(SchemaError::ShapeMismatch {
            path: path.to_string(),
            expected: template.kind(),
            found: value_kind(data),
        }),
    }
}

fn filter_map(
    template: &AttributeTemplate,
    fields: &Map<String, Value>,
    path: &str,
) -> Result<Map<String, Value>> {
    let AttributeTemplate::Map(allowed) = template else {
        return Err(SchemaError::ShapeMismatch {
            path: path.to_string(),
            expected: template.kind(),
            found: "mapping",
        });
    };

    let mut kept = Map::new();
    for (key, value) in fields {
        if let Some(child) = allowed.get(key) {
            kept.insert(key.clone(), filter_at(child, value, &key_path(path, key))?);
        }
    }
    Ok(kept)
}

pub(crate) fn key_path(parent: &str, key: &str) -> String {
    if parent == ROOT {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
