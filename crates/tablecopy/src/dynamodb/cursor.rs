//! Scan cursor encoding.
//!
//! A scan cursor is the primary key of the last evaluated item. Key
//! attributes are always S, N or B, so the cursor is stored in DynamoDB's
//! JSON form with binary values in base64.

use std::collections::HashMap;

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use thiserror::Error;

/// Item or key as exchanged with DynamoDB.
pub type Item = HashMap<String, AttributeValue>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("Attribute '{0}' is not a string, number or binary key attribute")]
    UnsupportedType(String),

    #[error("Attribute '{attribute}' is malformed: {reason}")]
    Malformed { attribute: String, reason: String },
}

/// Encodes a key as `{"name": {"S": "..."}}` JSON.
pub fn encode_key(key: &Item) -> Result<Value, CursorError> {
    let mut encoded = Map::new();
    for (name, value) in key {
        let (kind, text) = match value {
            AttributeValue::S(s) => ("S", s.clone()),
            AttributeValue::N(n) => ("N", n.clone()),
            AttributeValue::B(b) => ("B", STANDARD.encode(b.as_ref())),
            _ => return Err(CursorError::UnsupportedType(name.clone())),
        };
        let mut typed = Map::new();
        typed.insert(kind.to_string(), Value::String(text));
        encoded.insert(name.clone(), Value::Object(typed));
    }
    Ok(Value::Object(encoded))
}

/// Decodes a key written by [`encode_key`].
pub fn decode_key(value: &Value) -> Result<Item, CursorError> {
    let fields = value.as_object().ok_or_else(|| CursorError::Malformed {
        attribute: "<root>".to_string(),
        reason: "expected an object".to_string(),
    })?;

    fields
        .iter()
        .map(|(name, typed)| -> Result<(String, AttributeValue), CursorError> {
            let malformed = |reason: &str| CursorError::Malformed {
                attribute: name.clone(),
                reason: reason.to_string(),
            };
            let (kind, text) = typed
                .as_object()
                .filter(|typed| typed.len() == 1)
                .and_then(|typed| typed.iter().next())
                .ok_or_else(|| malformed("expected a single type tag"))?;
            let text = text
                .as_str()
                .ok_or_else(|| malformed("expected a string value"))?;

            let value = match kind.as_str() {
                "S" => AttributeValue::S(text.to_string()),
                "N" => AttributeValue::N(text.to_string()),
                "B" => AttributeValue::B(Blob::new(
                    STANDARD
                        .decode(text)
                        .map_err(|e| malformed(&e.to_string()))?,
                )),
                _ => return Err(CursorError::UnsupportedType(name.clone())),
            };
            Ok((name.clone(), value))
        })
        .collect()
}
