//! Attribute templates (Functional Core - pure data).
//!
//! A template describes which parts of a table description are legal in a
//! create-table request. It is written in the same JSON form the service
//! uses: an empty string is a scalar leaf, an object lists the keys to keep,
//! and a one-element array gives the shape of every element of a sequence.
//! Only override files are parsed; the built-in template is constructed
//! directly.

use std::collections::BTreeMap;

use serde_json::Value;

use super::error::{Result, SchemaError};

/// Shape definition used to prune a table description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeTemplate {
    /// Any string, boolean or number, kept as-is.
    Scalar,
    /// Keep only these keys, each filtered against its own template.
    Map(BTreeMap<String, AttributeTemplate>),
    /// Every element must match the inner template.
    List(Box<AttributeTemplate>),
}

impl AttributeTemplate {
    /// Builds a mapping node from `(key, template)` pairs.
    pub fn map<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AttributeTemplate)>,
    {
        Self::Map(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a sequence node whose elements must match `element`.
    pub fn list(element: AttributeTemplate) -> Self {
        Self::List(Box::new(element))
    }

    /// Parses the JSON form of a template.
    pub fn from_json(value: &Value) -> Result<Self> {
        parse_node(value, "<root>")
    }

    /// The fields accepted by the DynamoDB CreateTable call.
    pub fn table_creation() -> Self {
        use AttributeTemplate::Scalar;

        let key_schema = || Self::list(Self::map([("AttributeName", Scalar), ("KeyType", Scalar)]));
        let projection = || {
            Self::map([
                ("ProjectionType", Scalar),
                ("NonKeyAttributes", Self::list(Scalar)),
            ])
        };
        let provisioned =
            || Self::map([("ReadCapacityUnits", Scalar), ("WriteCapacityUnits", Scalar)]);
        let on_demand = || {
            Self::map([
                ("MaxReadRequestUnits", Scalar),
                ("MaxWriteRequestUnits", Scalar),
            ])
        };

        Self::map([
            (
                "AttributeDefinitions",
                Self::list(Self::map([
                    ("AttributeName", Scalar),
                    ("AttributeType", Scalar),
                ])),
            ),
            ("KeySchema", key_schema()),
            (
                "LocalSecondaryIndexes",
                Self::list(Self::map([
                    ("IndexName", Scalar),
                    ("KeySchema", key_schema()),
                    ("Projection", projection()),
                ])),
            ),
            (
                "GlobalSecondaryIndexes",
                Self::list(Self::map([
                    ("IndexName", Scalar),
                    ("KeySchema", key_schema()),
                    ("Projection", projection()),
                    ("ProvisionedThroughput", provisioned()),
                    ("OnDemandThroughput", on_demand()),
                ])),
            ),
            ("ProvisionedThroughput", provisioned()),
            ("OnDemandThroughput", on_demand()),
        ])
    }

    /// Returns the child template for `key`, if this is a mapping node.
    pub fn field(&self, key: &str) -> Option<&AttributeTemplate> {
        match self {
            Self::Map(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Human readable name of the node kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Map(_) => "mapping",
            Self::List(_) => "sequence",
        }
    }
}

fn parse_node(value: &Value, path: &str) -> Result<AttributeTemplate> {
    match value {
        Value::String(s) if s.is_empty() => Ok(AttributeTemplate::Scalar),
        Value::Object(fields) => {
            let mut parsed = BTreeMap::new();
            for (key, child) in fields {
                let child_path = super::filter::key_path(path, key);
                parsed.insert(key.clone(), parse_node(child, &child_path)?);
            }
            Ok(AttributeTemplate::Map(parsed))
        }
        Value::Array(items) => match items.as_slice() {
            [element] => Ok(AttributeTemplate::list(parse_node(
                element,
                &super::filter::index_path(path, 0),
            )?)),
            _ => Err(SchemaError::TemplateError {
                path: path.to_string(),
                reason: format!(
                    "sequence nodes must have exactly one element, found {}",
                    items.len()
                ),
            }),
        },
        other => Err(SchemaError::TemplateError {
            path: path.to_string(),
            reason: format!(
                "leaves must be empty strings, found {}",
                super::filter::value_kind(other)
            ),
        }),
    }
}
