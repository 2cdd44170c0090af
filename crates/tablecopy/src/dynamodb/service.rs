//! DynamoDB implementation of the table services (Imperative Shell).

use async_trait::async_trait;
use aws_sdk_dynamodb::types::Select;
use aws_sdk_dynamodb::Client;
use tablecopy_core::table::{
    CreationRequest, ScanPage, ServiceResult, TableControl, TableData, TableDescriptor,
};

use super::create::CreateTableParams;
use super::cursor::Item;
use super::describe::table_to_descriptor;
use super::error::map_sdk_error;

/// Table services backed by an AWS SDK client.
#[derive(Debug, Clone)]
pub struct DynamoDbService {
    client: Client,
}

impl DynamoDbService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TableControl for DynamoDbService {
    async fn describe_table(&self, table_name: &str) -> ServiceResult<Option<TableDescriptor>> {
        match self.client.describe_table().table_name(table_name).send().await {
            Ok(output) => Ok(output.table().map(table_to_descriptor)),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(map_sdk_error("DescribeTable", err)),
        }
    }

    async fn create_table(&self, request: &CreationRequest) -> ServiceResult<()> {
        let params = CreateTableParams::from_request(request)?;
        params
            .apply(self.client.create_table())
            .send()
            .await
            .map_err(|err| map_sdk_error("CreateTable", err))?;
        Ok(())
    }
}

#[async_trait]
impl TableData for DynamoDbService {
    type Record = Item;
    type Cursor = Item;

    async fn scan(
        &self,
        table_name: &str,
        cursor: Option<&Item>,
    ) -> ServiceResult<ScanPage<Item, Item>> {
        let output = self
            .client
            .scan()
            .table_name(table_name)
            .select(Select::AllAttributes)
            .set_exclusive_start_key(cursor.cloned())
            .send()
            .await
            .map_err(|err| map_sdk_error("Scan", err))?;

        Ok(ScanPage {
            records: output.items.unwrap_or_default(),
            cursor: output.last_evaluated_key.filter(|key| !key.is_empty()),
        })
    }

    async fn put(&self, table_name: &str, record: &Item) -> ServiceResult<()> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(record.clone()))
            .send()
            .await
            .map_err(|err| map_sdk_error("PutItem", err))?;
        Ok(())
    }
}
