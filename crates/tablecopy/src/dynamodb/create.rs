//! CreateTable request conversion.
//!
//! Turns a `CreationRequest` (wire-named JSON) into the typed parameters of
//! the SDK's CreateTable operation.

use aws_sdk_dynamodb::operation::create_table::builders::CreateTableFluentBuilder;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType,
    LocalSecondaryIndex, OnDemandThroughput, Projection, ProjectionType, ProvisionedThroughput,
    ScalarAttributeType, TableClass,
};
use serde_json::Value;
use tablecopy_core::table::{CreationRequest, ServiceResult};

use super::error::invalid_request;

const OPERATION: &str = "CreateTable";

/// Typed parameters of a CreateTable call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableParams {
    pub table_name: String,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub key_schema: Vec<KeySchemaElement>,
    pub local_secondary_indexes: Option<Vec<LocalSecondaryIndex>>,
    pub global_secondary_indexes: Option<Vec<GlobalSecondaryIndex>>,
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    pub on_demand_throughput: Option<OnDemandThroughput>,
    pub billing_mode: Option<BillingMode>,
    pub table_class: Option<TableClass>,
}

impl CreateTableParams {
    /// Converts a creation request. Fails if a required field is missing or
    /// has the wrong type.
    pub fn from_request(request: &CreationRequest) -> ServiceResult<Self> {
        let table_name = request
            .table_name()
            .ok_or_else(|| invalid_request(OPERATION, "TableName is required"))?
            .to_string();

        Ok(Self {
            table_name,
            attribute_definitions: items(
                request.get("AttributeDefinitions"),
                "AttributeDefinitions",
            )?
            .iter()
            .map(attribute_definition)
            .collect::<ServiceResult<_>>()?,
            key_schema: key_schema(request.get("KeySchema"), "KeySchema")?,
            local_secondary_indexes: optional_items(request.get("LocalSecondaryIndexes"))
                .map(|indexes| {
                    indexes
                        .iter()
                        .map(local_secondary_index)
                        .collect::<ServiceResult<Vec<_>>>()
                })
                .transpose()?,
            global_secondary_indexes: optional_items(request.get("GlobalSecondaryIndexes"))
                .map(|indexes| {
                    indexes
                        .iter()
                        .map(global_secondary_index)
                        .collect::<ServiceResult<Vec<_>>>()
                })
                .transpose()?,
            provisioned_throughput: request
                .get("ProvisionedThroughput")
                .map(provisioned_throughput)
                .transpose()?,
            on_demand_throughput: request.get("OnDemandThroughput").map(on_demand_throughput),
            billing_mode: request.billing_mode().map(|mode| BillingMode::from(mode.as_str())),
            table_class: request.table_class().map(|class| TableClass::from(class.as_str())),
        })
    }

    /// Sets every parameter on a CreateTable builder.
    pub fn apply(self, builder: CreateTableFluentBuilder) -> CreateTableFluentBuilder {
        builder
            .table_name(self.table_name)
            .set_attribute_definitions(Some(self.attribute_definitions))
            .set_key_schema(Some(self.key_schema))
            .set_local_secondary_indexes(self.local_secondary_indexes)
            .set_global_secondary_indexes(self.global_secondary_indexes)
            .set_provisioned_throughput(self.provisioned_throughput)
            .set_on_demand_throughput(self.on_demand_throughput)
            .set_billing_mode(self.billing_mode)
            .set_table_class(self.table_class)
    }
}

fn attribute_definition(value: &Value) -> ServiceResult<AttributeDefinition> {
    AttributeDefinition::builder()
        .attribute_name(string(value, "AttributeName")?)
        .attribute_type(ScalarAttributeType::from(string(value, "AttributeType")?))
        .build()
        .map_err(|e| invalid_request(OPERATION, e))
}

fn key_schema(value: Option<&Value>, field: &str) -> ServiceResult<Vec<KeySchemaElement>> {
    items(value, field)?
        .iter()
        .map(|element| {
            KeySchemaElement::builder()
                .attribute_name(string(element, "AttributeName")?)
                .key_type(KeyType::from(string(element, "KeyType")?))
                .build()
                .map_err(|e| invalid_request(OPERATION, e))
        })
        .collect()
}

fn projection(value: Option<&Value>) -> ServiceResult<Projection> {
    let value = value.ok_or_else(|| invalid_request(OPERATION, "Projection is required"))?;
    let non_key_attributes = optional_items(value.get("NonKeyAttributes"))
        .map(|names| {
            names
                .iter()
                .map(|name| {
                    name.as_str().map(str::to_string).ok_or_else(|| {
                        invalid_request(OPERATION, "NonKeyAttributes must be strings")
                    })
                })
                .collect::<ServiceResult<Vec<_>>>()
        })
        .transpose()?;

    Ok(Projection::builder()
        .set_projection_type(
            value
                .get("ProjectionType")
                .and_then(Value::as_str)
                .map(ProjectionType::from),
        )
        .set_non_key_attributes(non_key_attributes)
        .build())
}

fn local_secondary_index(value: &Value) -> ServiceResult<LocalSecondaryIndex> {
    LocalSecondaryIndex::builder()
        .index_name(string(value, "IndexName")?)
        .set_key_schema(Some(key_schema(value.get("KeySchema"), "KeySchema")?))
        .projection(projection(value.get("Projection"))?)
        .build()
        .map_err(|e| invalid_request(OPERATION, e))
}

fn global_secondary_index(value: &Value) -> ServiceResult<GlobalSecondaryIndex> {
    GlobalSecondaryIndex::builder()
        .index_name(string(value, "IndexName")?)
        .set_key_schema(Some(key_schema(value.get("KeySchema"), "KeySchema")?))
        .projection(projection(value.get("Projection"))?)
        .set_provisioned_throughput(
            value
                .get("ProvisionedThroughput")
                .map(provisioned_throughput)
                .transpose()?,
        )
        .set_on_demand_throughput(value.get("OnDemandThroughput").map(on_demand_throughput))
        .build()
        .map_err(|e| invalid_request(OPERATION, e))
}

fn provisioned_throughput(value: &Value) -> ServiceResult<ProvisionedThroughput> {
    ProvisionedThroughput::builder()
        .set_read_capacity_units(value.get("ReadCapacityUnits").and_then(Value::as_i64))
        .set_write_capacity_units(value.get("WriteCapacityUnits").and_then(Value::as_i64))
        .build()
        .map_err(|e| invalid_request(OPERATION, e))
}

fn on_demand_throughput(value: &Value) -> OnDemandThroughput {
    OnDemandThroughput::builder()
        .set_max_read_request_units(value.get("MaxReadRequestUnits").and_then(Value::as_i64))
        .set_max_write_request_units(value.get("MaxWriteRequestUnits").and_then(Value::as_i64))
        .build()
}

fn items<'a>(value: Option<&'a Value>, field: &str) -> ServiceResult<&'a [Value]> {
    optional_items(value).ok_or_else(|| invalid_request(OPERATION, format!("{field} is required")))
}

fn optional_items(value: Option<&Value>) -> Option<&[Value]> {
    value.and_then(Value::as_array).map(Vec::as_slice)
}

fn string<'a>(value: &'a Value, field: &str) -> ServiceResult<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid_request(OPERATION, format!("{field} is required")))
}
