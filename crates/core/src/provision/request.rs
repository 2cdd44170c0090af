//! Derivation of the create-table request (Functional Core - pure functions).

use serde_json::{Map, Value};

use crate::error::Result;
use crate::schema::{filter_object, AttributeTemplate};
use crate::table::{BillingMode, CreationRequest, TableClass, TableDescriptor};

const PROVISIONED_THROUGHPUT: &str = "ProvisionedThroughput";
const ON_DEMAND_THROUGHPUT: &str = "OnDemandThroughput";
const GLOBAL_SECONDARY_INDEXES: &str = "GlobalSecondaryIndexes";

/// Builds the request that creates `destination` with the schema of `source`.
///
/// The source description is filtered against `template`, then the fields
/// that pruning alone cannot produce are derived:
///
/// - `BillingMode`: the source's billing-mode summary; otherwise
///   `PAY_PER_REQUEST` when the filtered request carries an
///   `OnDemandThroughput` block; otherwise `PROVISIONED`.
/// - `TableClass`: the source's table-class summary, or `STANDARD`.
/// - `TableName`: the destination name.
///
/// Throughput blocks that contradict the billing mode are dropped, since
/// CreateTable rejects them.
pub fn build_creation_request(
    template: &AttributeTemplate,
    source: &TableDescriptor,
    destination: &str,
) -> Result<CreationRequest> {
    let mut fields = filter_object(template, source.fields())?;

    let billing_mode = source.billing_mode_summary().unwrap_or_else(|| {
        if fields.contains_key(ON_DEMAND_THROUGHPUT) {
            BillingMode::PayPerRequest
        } else {
            BillingMode::Provisioned
        }
    });
    let table_class = source.table_class_summary().unwrap_or(TableClass::Standard);

    match billing_mode {
        BillingMode::PayPerRequest => remove_throughput(&mut fields, PROVISIONED_THROUGHPUT),
        BillingMode::Provisioned => remove_throughput(&mut fields, ON_DEMAND_THROUGHPUT),
        BillingMode::Unknown(_) => {}
    }

    fields.insert(
        "BillingMode".to_string(),
        Value::String(billing_mode.as_str().to_string()),
    );
    fields.insert(
        "TableClass".to_string(),
        Value::String(table_class.as_str().to_string()),
    );
    fields.insert(
        "TableName".to_string(),
        Value::String(destination.to_string()),
    );

    Ok(CreationRequest::new(fields))
}

/// Removes `key` from the table and from every global secondary index.
fn remove_throughput(fields: &mut Map<String, Value>, key: &str) {
    fields.remove(key);
    if let Some(Value::Array(indexes)) = fields.get_mut(GLOBAL_SECONDARY_INDEXES) {
        for index in indexes.iter_mut().filter_map(Value::as_object_mut) {
            index.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CopyError;
    use crate::schema::SchemaError;
    use serde_json::json;

    fn source(extra: Value) -> TableDescriptor {
        let mut value = json!({
            "TableName": "orders-prod",
            "TableStatus": "ACTIVE",
            "TableId": "6a0b1f4e",
            "AttributeDefinitions": [{ "AttributeName": "pk", "AttributeType": "S" }],
            "KeySchema": [{ "AttributeName": "pk", "KeyType": "HASH" }],
            "ProvisionedThroughput": {
                "ReadCapacityUnits": 5,
                "WriteCapacityUnits": 5,
                "NumberOfDecreasesToday": 0
            }
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut value, extra) {
            base.extend(extra);
        }
        TableDescriptor::from_value(value).unwrap()
    }

    fn build(source: &TableDescriptor) -> CreationRequest {
        build_creation_request(&AttributeTemplate::table_creation(), source, "orders-staging")
            .unwrap()
    }

    #[test]
    fn test_defaults_to_provisioned_without_summary_or_on_demand_block() {
        let request = build(&source(json!({})));

        assert_eq!(request.billing_mode(), Some(BillingMode::Provisioned));
        assert_eq!(
            request.get("ProvisionedThroughput"),
            Some(&json!({ "ReadCapacityUnits": 5, "WriteCapacityUnits": 5 }))
        );
    }

    #[test]
    fn test_on_demand_block_implies_pay_per_request() {
        let request = build(&source(json!({
            "OnDemandThroughput": { "MaxReadRequestUnits": 100, "MaxWriteRequestUnits": 50 }
        })));

        assert_eq!(request.billing_mode(), Some(BillingMode::PayPerRequest));
        assert!(request.contains("OnDemandThroughput"));
        assert!(!request.contains("ProvisionedThroughput"));
    }

    #[test]
    fn test_billing_mode_summary_wins() {
        let request = build(&source(json!({
            "BillingModeSummary": { "BillingMode": "PROVISIONED" },
            "OnDemandThroughput": { "MaxReadRequestUnits": -1, "MaxWriteRequestUnits": -1 }
        })));

        assert_eq!(request.billing_mode(), Some(BillingMode::Provisioned));
        assert!(!request.contains("OnDemandThroughput"));
    }

    #[test]
    fn test_pay_per_request_drops_index_capacity() {
        let request = build(&source(json!({
            "BillingModeSummary": { "BillingMode": "PAY_PER_REQUEST" },
            "GlobalSecondaryIndexes": [{
                "IndexName": "by-customer",
                "KeySchema": [{ "AttributeName": "customer", "KeyType": "HASH" }],
                "Projection": { "ProjectionType": "ALL" },
                "ProvisionedThroughput": { "ReadCapacityUnits": 0, "WriteCapacityUnits": 0 },
                "OnDemandThroughput": { "MaxReadRequestUnits": 10, "MaxWriteRequestUnits": 10 }
            }]
        })));

        assert_eq!(
            request.get("GlobalSecondaryIndexes"),
            Some(&json!([{
                "IndexName": "by-customer",
                "KeySchema": [{ "AttributeName": "customer", "KeyType": "HASH" }],
                "Projection": { "ProjectionType": "ALL" },
                "OnDemandThroughput": { "MaxReadRequestUnits": 10, "MaxWriteRequestUnits": 10 }
            }]))
        );
    }

    #[test]
    fn test_table_class_defaults_to_standard() {
        let request = build(&source(json!({})));
        assert_eq!(request.table_class(), Some(TableClass::Standard));
    }

    #[test]
    fn test_table_class_summary_is_copied() {
        let request = build(&source(json!({
            "TableClassSummary": { "TableClass": "STANDARD_INFREQUENT_ACCESS" }
        })));
        assert_eq!(
            request.table_class(),
            Some(TableClass::StandardInfrequentAccess)
        );
    }

    #[test]
    fn test_table_name_is_destination_and_other_fields_are_pruned() {
        let request = build(&source(json!({})));

        assert_eq!(request.table_name(), Some("orders-staging"));
        assert!(!request.contains("TableStatus"));
        assert!(!request.contains("TableId"));
        assert_eq!(
            request.get("KeySchema"),
            Some(&json!([{ "AttributeName": "pk", "KeyType": "HASH" }]))
        );
    }

    #[test]
    fn test_source_descriptor_is_left_untouched() {
        let original = source(json!({}));
        let snapshot = original.clone();

        build(&original);

        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let broken = source(json!({ "KeySchema": { "AttributeName": "pk" } }));

        let err = build_creation_request(
            &AttributeTemplate::table_creation(),
            &broken,
            "orders-staging",
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CopyError::Schema(SchemaError::ShapeMismatch { ref path, .. }) if path == "KeySchema"
        ));
    }
}
