//! Pure functions for deciding how to provision the destination table.

use serde_json::Value;

use super::request::build_creation_request;
use crate::error::{CopyError, Result};
use crate::schema::AttributeTemplate;
use crate::table::{CreationRequest, TableDescriptor, TableStatus};

/// What the provisioner has to do for the destination table.
#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionPlan {
    /// The destination exists and is active; creation is skipped.
    AlreadyActive { table_name: String },
    /// The destination does not exist and will be created.
    Create { request: CreationRequest },
}

/// Decides the provisioning step from the two table descriptions.
///
/// - A missing source is [`CopyError::SourceNotFound`].
/// - An active destination needs nothing; one in any other state is
///   [`CopyError::InconsistentDestination`].
/// - A missing destination is created from the source, which must be active.
pub fn plan_provisioning(
    template: &AttributeTemplate,
    source_name: &str,
    source: Option<&TableDescriptor>,
    destination_name: &str,
    destination: Option<&TableDescriptor>,
) -> Result<ProvisionPlan> {
    let source = source.ok_or_else(|| CopyError::SourceNotFound {
        table_name: source_name.to_string(),
    })?;

    if let Some(destination) = destination {
        return match status_of(destination) {
            TableStatus::Active => Ok(ProvisionPlan::AlreadyActive {
                table_name: destination_name.to_string(),
            }),
            status => Err(CopyError::InconsistentDestination {
                table_name: destination_name.to_string(),
                status,
            }),
        };
    }

    let status = status_of(source);
    if status != TableStatus::Active {
        return Err(CopyError::InvalidSourceState {
            table_name: source_name.to_string(),
            status,
        });
    }

    let request = build_creation_request(template, source, destination_name)?;
    Ok(ProvisionPlan::Create { request })
}

/// Status of a described table; a description without one is never ACTIVE.
pub(crate) fn status_of(table: &TableDescriptor) -> TableStatus {
    table
        .status()
        .unwrap_or_else(|| TableStatus::Unknown("MISSING".to_string()))
}

/// Formats a provisioning plan for display.
pub fn format_plan(plan: &ProvisionPlan) -> Vec<String> {
    match plan {
        ProvisionPlan::AlreadyActive { table_name } => {
            vec![format!(
                "= Table '{}' already exists and is ACTIVE, skipping creation",
                table_name
            )]
        }
        ProvisionPlan::Create { request } => {
            let mut lines = vec![format!(
                "+ Create table: {}",
                request.table_name().unwrap_or_default()
            )];
            for key in as_array(request.get("KeySchema")) {
                lines.push(format!(
                    "  Key: {} ({})",
                    str_field(key, "AttributeName"),
                    str_field(key, "KeyType")
                ));
            }
            for (label, field) in [
                ("LSI", "LocalSecondaryIndexes"),
                ("GSI", "GlobalSecondaryIndexes"),
            ] {
                for index in as_array(request.get(field)) {
                    lines.push(format!("  + {}: {}", label, str_field(index, "IndexName")));
                }
            }
            if let Some(mode) = request.billing_mode() {
                lines.push(format!("  Billing: {}", mode.as_str()));
            }
            if let Some(class) = request.table_class() {
                lines.push(format!("  Class: {}", class.as_str()));
            }
            lines
        }
    }
}

fn as_array(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::BillingMode;
    use serde_json::json;

    fn table(name: &str, status: &str) -> TableDescriptor {
        TableDescriptor::from_value(json!({
            "TableName": name,
            "TableStatus": status,
            "AttributeDefinitions": [
                { "AttributeName": "pk", "AttributeType": "S" },
                { "AttributeName": "created", "AttributeType": "N" }
            ],
            "KeySchema": [
                { "AttributeName": "pk", "KeyType": "HASH" },
                { "AttributeName": "created", "KeyType": "RANGE" }
            ],
            "LocalSecondaryIndexes": [{
                "IndexName": "by-created",
                "KeySchema": [
                    { "AttributeName": "pk", "KeyType": "HASH" },
                    { "AttributeName": "created", "KeyType": "RANGE" }
                ],
                "Projection": { "ProjectionType": "KEYS_ONLY" },
                "IndexSizeBytes": 0
            }],
            "ProvisionedThroughput": { "ReadCapacityUnits": 5, "WriteCapacityUnits": 5 }
        }))
        .unwrap()
    }

    fn plan(
        source: Option<&TableDescriptor>,
        destination: Option<&TableDescriptor>,
    ) -> Result<ProvisionPlan> {
        plan_provisioning(
            &AttributeTemplate::table_creation(),
            "orders-prod",
            source,
            "orders-staging",
            destination,
        )
    }

    #[test]
    fn test_missing_source_is_an_error() {
        assert_eq!(
            plan(None, None),
            Err(CopyError::SourceNotFound {
                table_name: "orders-prod".to_string()
            })
        );
    }

    #[test]
    fn test_active_destination_skips_creation() {
        let source = table("orders-prod", "ACTIVE");
        let destination = table("orders-staging", "ACTIVE");

        assert_eq!(
            plan(Some(&source), Some(&destination)),
            Ok(ProvisionPlan::AlreadyActive {
                table_name: "orders-staging".to_string()
            })
        );
    }

    #[test]
    fn test_inactive_destination_is_inconsistent() {
        let source = table("orders-prod", "ACTIVE");
        let destination = table("orders-staging", "CREATING");

        assert_eq!(
            plan(Some(&source), Some(&destination)),
            Err(CopyError::InconsistentDestination {
                table_name: "orders-staging".to_string(),
                status: TableStatus::Creating,
            })
        );
    }

    #[test]
    fn test_destination_check_precedes_source_status_check() {
        let source = table("orders-prod", "UPDATING");
        let destination = table("orders-staging", "ACTIVE");

        assert!(matches!(
            plan(Some(&source), Some(&destination)),
            Ok(ProvisionPlan::AlreadyActive { .. })
        ));
    }

    #[test]
    fn test_inactive_source_cannot_be_copied() {
        let source = table("orders-prod", "UPDATING");

        assert_eq!(
            plan(Some(&source), None),
            Err(CopyError::InvalidSourceState {
                table_name: "orders-prod".to_string(),
                status: TableStatus::Updating,
            })
        );
    }

    #[test]
    fn test_missing_destination_is_created_from_source() {
        let source = table("orders-prod", "ACTIVE");

        let Ok(ProvisionPlan::Create { request }) = plan(Some(&source), None) else {
            panic!("expected a create plan");
        };

        assert_eq!(request.table_name(), Some("orders-staging"));
        assert_eq!(request.billing_mode(), Some(BillingMode::Provisioned));
        assert_eq!(request.get("KeySchema"), source.fields().get("KeySchema"));
    }

    #[test]
    fn test_format_create_plan() {
        let source = table("orders-prod", "ACTIVE");
        let created = plan(Some(&source), None).unwrap();

        assert_eq!(
            format_plan(&created),
            vec![
                "+ Create table: orders-staging".to_string(),
                "  Key: pk (HASH)".to_string(),
                "  Key: created (RANGE)".to_string(),
                "  + LSI: by-created".to_string(),
                "  Billing: PROVISIONED".to_string(),
                "  Class: STANDARD".to_string(),
            ]
        );
    }

    #[test]
    fn test_format_already_active_plan() {
        let plan = ProvisionPlan::AlreadyActive {
            table_name: "orders-staging".to_string(),
        };
        assert_eq!(
            format_plan(&plan),
            vec!["= Table 'orders-staging' already exists and is ACTIVE, skipping creation"]
        );
    }
}
