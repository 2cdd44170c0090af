//! DescribeTable output conversion.
//!
//! Pure functions turning the SDK's `TableDescription` into a
//! `TableDescriptor` keyed by the DynamoDB wire names, so the attribute
//! template can filter it. Absent values and empty lists are left out.

use aws_sdk_dynamodb::primitives::DateTime;
use aws_sdk_dynamodb::types::{
    GlobalSecondaryIndexDescription, KeySchemaElement, LocalSecondaryIndexDescription,
    OnDemandThroughput, Projection, ProvisionedThroughputDescription, TableDescription,
};
use serde_json::{Map, Value};
use tablecopy_core::table::TableDescriptor;

/// Convert a described table to a descriptor.
pub fn table_to_descriptor(table: &TableDescription) -> TableDescriptor {
    let fields = object([
        ("TableName", table.table_name().map(Value::from)),
        ("TableStatus", table.table_status().map(|s| s.as_str().into())),
        ("TableArn", table.table_arn().map(Value::from)),
        ("TableId", table.table_id().map(Value::from)),
        ("CreationDateTime", table.creation_date_time().map(timestamp)),
        ("ItemCount", table.item_count().map(Value::from)),
        ("TableSizeBytes", table.table_size_bytes().map(Value::from)),
        (
            "AttributeDefinitions",
            list(table.attribute_definitions(), |definition| {
                object([
                    ("AttributeName", Some(definition.attribute_name().into())),
                    ("AttributeType", Some(definition.attribute_type().as_str().into())),
                ])
            }),
        ),
        ("KeySchema", list(table.key_schema(), key_schema_element)),
        (
            "ProvisionedThroughput",
            table.provisioned_throughput().map(provisioned_throughput),
        ),
        (
            "OnDemandThroughput",
            table.on_demand_throughput().map(on_demand_throughput),
        ),
        (
            "BillingModeSummary",
            table.billing_mode_summary().map(|summary| {
                object([
                    ("BillingMode", summary.billing_mode().map(|m| m.as_str().into())),
                    (
                        "LastUpdateToPayPerRequestDateTime",
                        summary.last_update_to_pay_per_request_date_time().map(timestamp),
                    ),
                ])
            }),
        ),
        (
            "TableClassSummary",
            table.table_class_summary().map(|summary| {
                object([
                    ("TableClass", summary.table_class().map(|c| c.as_str().into())),
                    ("LastUpdateDateTime", summary.last_update_date_time().map(timestamp)),
                ])
            }),
        ),
        (
            "LocalSecondaryIndexes",
            list(table.local_secondary_indexes(), local_secondary_index),
        ),
        (
            "GlobalSecondaryIndexes",
            list(table.global_secondary_indexes(), global_secondary_index),
        ),
        (
            "DeletionProtectionEnabled",
            table.deletion_protection_enabled().map(Value::from),
        ),
    ]);

    match fields {
        Value::Object(fields) => TableDescriptor::new(fields),
        _ => TableDescriptor::new(Map::new()),
    }
}

fn key_schema_element(element: &KeySchemaElement) -> Value {
    object([
        ("AttributeName", Some(element.attribute_name().into())),
        ("KeyType", Some(element.key_type().as_str().into())),
    ])
}

fn projection(projection: &Projection) -> Value {
    object([
        (
            "ProjectionType",
            projection.projection_type().map(|t| t.as_str().into()),
        ),
        (
            "NonKeyAttributes",
            list(projection.non_key_attributes(), |name| name.as_str().into()),
        ),
    ])
}

fn provisioned_throughput(throughput: &ProvisionedThroughputDescription) -> Value {
    object([
        ("ReadCapacityUnits", throughput.read_capacity_units().map(Value::from)),
        ("WriteCapacityUnits", throughput.write_capacity_units().map(Value::from)),
        (
            "NumberOfDecreasesToday",
            throughput.number_of_decreases_today().map(Value::from),
        ),
        (
            "LastIncreaseDateTime",
            throughput.last_increase_date_time().map(timestamp),
        ),
        (
            "LastDecreaseDateTime",
            throughput.last_decrease_date_time().map(timestamp),
        ),
    ])
}

fn on_demand_throughput(throughput: &OnDemandThroughput) -> Value {
    object([
        (
            "MaxReadRequestUnits",
            throughput.max_read_request_units().map(Value::from),
        ),
        (
            "MaxWriteRequestUnits",
            throughput.max_write_request_units().map(Value::from),
        ),
    ])
}

fn local_secondary_index(index: &LocalSecondaryIndexDescription) -> Value {
    object([
        ("IndexName", index.index_name().map(Value::from)),
        ("KeySchema", list(index.key_schema(), key_schema_element)),
        ("Projection", index.projection().map(projection)),
        ("IndexSizeBytes", index.index_size_bytes().map(Value::from)),
        ("ItemCount", index.item_count().map(Value::from)),
        ("IndexArn", index.index_arn().map(Value::from)),
    ])
}

fn global_secondary_index(index: &GlobalSecondaryIndexDescription) -> Value {
    object([
        ("IndexName", index.index_name().map(Value::from)),
        ("KeySchema", list(index.key_schema(), key_schema_element)),
        ("Projection", index.projection().map(projection)),
        ("IndexStatus", index.index_status().map(|s| s.as_str().into())),
        (
            "ProvisionedThroughput",
            index.provisioned_throughput().map(provisioned_throughput),
        ),
        (
            "OnDemandThroughput",
            index.on_demand_throughput().map(on_demand_throughput),
        ),
        ("IndexSizeBytes", index.index_size_bytes().map(Value::from)),
        ("ItemCount", index.item_count().map(Value::from)),
        ("IndexArn", index.index_arn().map(Value::from)),
    ])
}

/// Epoch seconds, as DynamoDB's JSON protocol encodes timestamps.
fn timestamp(time: &DateTime) -> Value {
    Value::from(time.as_secs_f64())
}

fn object<const N: usize>(fields: [(&str, Option<Value>); N]) -> Value {
    Value::Object(
        fields
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
            .collect(),
    )
}

fn list<T>(items: &[T], convert: impl Fn(&T) -> Value) -> Option<Value> {
    if items.is_empty() {
        None
    } else {
        Some(Value::Array(items.iter().map(convert).collect()))
    }
}
