//! Table data model shared by the provisioner and the copy engine.

use std::fmt;

use serde_json::{Map, Value};

/// Status of a table as reported by the table-control service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Active,
    Updating,
    Deleting,
    Archiving,
    Archived,
    InaccessibleEncryptionCredentials,
    Unknown(String),
}

impl TableStatus {
    /// Parses the service's wire value (e.g. `ACTIVE`).
    pub fn parse(value: &str) -> Self {
        match value {
            "CREATING" => Self::Creating,
            "ACTIVE" => Self::Active,
            "UPDATING" => Self::Updating,
            "DELETING" => Self::Deleting,
            "ARCHIVING" => Self::Archiving,
            "ARCHIVED" => Self::Archived,
            "INACCESSIBLE_ENCRYPTION_CREDENTIALS" => Self::InaccessibleEncryptionCredentials,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "CREATING",
            Self::Active => "ACTIVE",
            Self::Updating => "UPDATING",
            Self::Deleting => "DELETING",
            Self::Archiving => "ARCHIVING",
            Self::Archived => "ARCHIVED",
            Self::InaccessibleEncryptionCredentials => "INACCESSIBLE_ENCRYPTION_CREDENTIALS",
            Self::Unknown(other) => other,
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing mode for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingMode {
    Provisioned,
    PayPerRequest,
    Unknown(String),
}

impl BillingMode {
    pub fn parse(value: &str) -> Self {
        match value {
            "PROVISIONED" => Self::Provisioned,
            "PAY_PER_REQUEST" => Self::PayPerRequest,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Provisioned => "PROVISIONED",
            Self::PayPerRequest => "PAY_PER_REQUEST",
            Self::Unknown(other) => other,
        }
    }
}

/// Storage class for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableClass {
    Standard,
    StandardInfrequentAccess,
    Unknown(String),
}

impl TableClass {
    pub fn parse(value: &str) -> Self {
        match value {
            "STANDARD" => Self::Standard,
            "STANDARD_INFREQUENT_ACCESS" => Self::StandardInfrequentAccess,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Standard => "STANDARD",
            Self::StandardInfrequentAccess => "STANDARD_INFREQUENT_ACCESS",
            Self::Unknown(other) => other,
        }
    }
}

/// Full description of a table, keyed by the service's wire names.
///
/// The shape varies between service versions, so it is kept as an untyped
/// JSON object and only the few fields this crate needs are read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor(Map<String, Value>);

impl TableDescriptor {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wraps a JSON value; returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("TableName").and_then(Value::as_str)
    }

    /// `TableStatus`, if the description carries one.
    pub fn status(&self) -> Option<TableStatus> {
        self.0
            .get("TableStatus")
            .and_then(Value::as_str)
            .map(TableStatus::parse)
    }

    /// `BillingModeSummary.BillingMode`.
    pub fn billing_mode_summary(&self) -> Option<BillingMode> {
        nested_str(&self.0, "BillingModeSummary", "BillingMode").map(BillingMode::parse)
    }

    /// `TableClassSummary.TableClass`.
    pub fn table_class_summary(&self) -> Option<TableClass> {
        nested_str(&self.0, "TableClassSummary", "TableClass").map(TableClass::parse)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Payload handed to the create-table call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationRequest(Map<String, Value>);

impl CreationRequest {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn table_name(&self) -> Option<&str> {
        self.0.get("TableName").and_then(Value::as_str)
    }

    pub fn billing_mode(&self) -> Option<BillingMode> {
        self.0
            .get("BillingMode")
            .and_then(Value::as_str)
            .map(BillingMode::parse)
    }

    pub fn table_class(&self) -> Option<TableClass> {
        self.0
            .get("TableClass")
            .and_then(Value::as_str)
            .map(TableClass::parse)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// One page of a scan: its records and, unless it was the last page, the
/// cursor for the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage<R, C> {
    pub records: Vec<R>,
    pub cursor: Option<C>,
}

fn nested_str<'a>(fields: &'a Map<String, Value>, outer: &str, inner: &str) -> Option<&'a str> {
    fields.get(outer)?.get(inner)?.as_str()
}
