//! In-memory table service.
//!
//! Implements [`TableControl`] and [`TableData`] over HashMaps so the
//! provisioner, the copy engine and the orchestrator can be exercised
//! without a network. Every call is recorded, and failures can be injected
//! per operation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::copy::{Checkpoint, CheckpointStore};
use crate::error::Result;
use crate::table::{
    CreationRequest, ScanPage, ServiceError, ServiceResult, TableControl, TableData,
    TableDescriptor, TableStatus,
};

/// Record type of the in-memory service.
pub type InMemoryRecord = Map<String, Value>;

/// Operations that failures can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Describe,
    Create,
    Scan,
    Put,
}

/// A call received by the service, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Describe(String),
    Create(String),
    Scan {
        table_name: String,
        cursor: Option<usize>,
    },
    Put {
        table_name: String,
        record: InMemoryRecord,
    },
}

#[derive(Debug)]
struct Table {
    descriptor: Map<String, Value>,
    records: Vec<InMemoryRecord>,
    /// Describes left before a CREATING table settles.
    pending_polls: usize,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Table>,
    calls: Vec<Call>,
    injected: HashMap<Operation, (ServiceError, u32)>,
    puts_before_failure: Option<usize>,
}

impl State {
    fn take_injected(&mut self, operation: Operation) -> Option<ServiceError> {
        let (error, remaining) = self.injected.get_mut(&operation)?;
        if *remaining == 0 {
            return None;
        }
        *remaining -= 1;
        Some(error.clone())
    }
}

/// In-memory implementation of the table services.
#[derive(Debug, Clone)]
pub struct InMemoryTableService {
    state: Arc<Mutex<State>>,
    page_size: usize,
    activation_polls: usize,
    settled_status: TableStatus,
}

impl Default for InMemoryTableService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTableService {
    /// Creates an empty service. Created tables become ACTIVE on the first
    /// describe and scans return up to 100 records per page.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            page_size: 100,
            activation_polls: 1,
            settled_status: TableStatus::Active,
        }
    }

    /// Maximum number of records per scan page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Number of describes after which a created table leaves CREATING.
    pub fn with_activation_polls(mut self, polls: usize) -> Self {
        self.activation_polls = polls;
        self
    }

    /// Status a created table settles in (ACTIVE unless overridden).
    pub fn with_settled_status(mut self, status: TableStatus) -> Self {
        self.settled_status = status;
        self
    }

    /// Adds a table with the given description and records.
    pub async fn insert_table(&self, descriptor: TableDescriptor, records: Vec<InMemoryRecord>) {
        let fields = descriptor.fields().clone();
        let name = descriptor.name().unwrap_or_default().to_string();
        self.state.lock().await.tables.insert(
            name,
            Table {
                descriptor: fields,
                records,
                pending_polls: 0,
            },
        );
    }

    /// Makes the next `times` calls of `operation` fail with `error`.
    pub async fn inject(&self, operation: Operation, error: ServiceError, times: u32) {
        self.state
            .lock()
            .await
            .injected
            .insert(operation, (error, times));
    }

    /// Lets `successful` more puts through, then fails every put.
    pub async fn fail_puts_after(&self, successful: usize) {
        self.state.lock().await.puts_before_failure = Some(successful);
    }

    /// Removes all injected failures.
    pub async fn clear_failures(&self) {
        let mut state = self.state.lock().await;
        state.injected.clear();
        state.puts_before_failure = None;
    }

    /// All calls received so far.
    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    /// Records currently stored in `table_name`.
    pub async fn records(&self, table_name: &str) -> Vec<InMemoryRecord> {
        self.state
            .lock()
            .await
            .tables
            .get(table_name)
            .map(|t| t.records.clone())
            .unwrap_or_default()
    }

    /// Current description of `table_name`.
    pub async fn descriptor(&self, table_name: &str) -> Option<TableDescriptor> {
        self.state
            .lock()
            .await
            .tables
            .get(table_name)
            .map(|t| TableDescriptor::new(t.descriptor.clone()))
    }
}

#[async_trait]
impl TableControl for InMemoryTableService {
    async fn describe_table(&self, table_name: &str) -> ServiceResult<Option<TableDescriptor>> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::Describe(table_name.to_string()));
        if let Some(error) = state.take_injected(Operation::Describe) {
            return Err(error);
        }

        let Some(table) = state.tables.get_mut(table_name) else {
            return Ok(None);
        };
        if table.pending_polls > 0 {
            table.pending_polls -= 1;
            if table.pending_polls == 0 {
                table.descriptor.insert(
                    "TableStatus".to_string(),
                    Value::String(self.settled_status.as_str().to_string()),
                );
            }
        }
        Ok(Some(TableDescriptor::new(table.descriptor.clone())))
    }

    async fn create_table(&self, request: &CreationRequest) -> ServiceResult<()> {
        let table_name = request.table_name().unwrap_or_default().to_string();
        let mut state = self.state.lock().await;
        state.calls.push(Call::Create(table_name.clone()));
        if let Some(error) = state.take_injected(Operation::Create) {
            return Err(error);
        }
        if state.tables.contains_key(&table_name) {
            return Err(ServiceError::Failed(format!(
                "ResourceInUseException: Table already exists: {table_name}"
            )));
        }

        let mut descriptor = request.fields().clone();
        if let Some(mode) = descriptor.remove("BillingMode") {
            descriptor.insert(
                "BillingModeSummary".to_string(),
                serde_json::json!({ "BillingMode": mode }),
            );
        }
        if let Some(class) = descriptor.remove("TableClass") {
            descriptor.insert(
                "TableClassSummary".to_string(),
                serde_json::json!({ "TableClass": class }),
            );
        }
        descriptor.insert(
            "TableStatus".to_string(),
            Value::String(TableStatus::Creating.as_str().to_string()),
        );

        state.tables.insert(
            table_name,
            Table {
                descriptor,
                records: Vec::new(),
                pending_polls: self.activation_polls,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl TableData for InMemoryTableService {
    type Record = InMemoryRecord;
    type Cursor = usize;

    async fn scan(
        &self,
        table_name: &str,
        cursor: Option<&usize>,
    ) -> ServiceResult<ScanPage<InMemoryRecord, usize>> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::Scan {
            table_name: table_name.to_string(),
            cursor: cursor.copied(),
        });
        if let Some(error) = state.take_injected(Operation::Scan) {
            return Err(error);
        }

        let table = state
            .tables
            .get(table_name)
            .ok_or_else(|| not_found(table_name))?;
        let start = cursor.copied().unwrap_or(0).min(table.records.len());
        let end = (start + self.page_size).min(table.records.len());

        Ok(ScanPage {
            records: table.records[start..end].to_vec(),
            cursor: (end < table.records.len()).then_some(end),
        })
    }

    async fn put(&self, table_name: &str, record: &InMemoryRecord) -> ServiceResult<()> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::Put {
            table_name: table_name.to_string(),
            record: record.clone(),
        });
        if let Some(error) = state.take_injected(Operation::Put) {
            return Err(error);
        }
        match state.puts_before_failure.as_mut() {
            Some(0) => {
                return Err(ServiceError::Failed(
                    "InternalServerError: injected write failure".to_string(),
                ))
            }
            Some(remaining) => *remaining -= 1,
            None => {}
        }

        let table = state
            .tables
            .get_mut(table_name)
            .ok_or_else(|| not_found(table_name))?;
        let keys = key_attributes(&table.descriptor);
        let same_key = |existing: &InMemoryRecord| {
            !keys.is_empty() && keys.iter().all(|k| existing.get(*k) == record.get(*k))
        };

        match table.records.iter().position(same_key) {
            Some(index) => table.records[index] = record.clone(),
            None => table.records.push(record.clone()),
        }
        Ok(())
    }
}

fn not_found(table_name: &str) -> ServiceError {
    ServiceError::Failed(format!(
        "ResourceNotFoundException: Requested resource not found: {table_name}"
    ))
}

fn key_attributes(descriptor: &Map<String, Value>) -> Vec<&str> {
    descriptor
        .get("KeySchema")
        .and_then(Value::as_array)
        .map(|keys| {
            keys.iter()
                .filter_map(|k| k.get("AttributeName").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

/// Checkpoint store that keeps the last saved checkpoint in memory.
#[derive(Debug)]
pub struct InMemoryCheckpointStore<C> {
    current: Mutex<Option<Checkpoint<C>>>,
    saves: Mutex<Vec<Checkpoint<C>>>,
}

impl<C> Default for InMemoryCheckpointStore<C> {
    fn default() -> Self {
        Self {
            current: Mutex::new(None),
            saves: Mutex::new(Vec::new()),
        }
    }
}

impl<C: Clone> InMemoryCheckpointStore<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The checkpoint a resumed run would start from.
    pub async fn current(&self) -> Option<Checkpoint<C>> {
        self.current.lock().await.clone()
    }

    /// Every checkpoint saved so far, oldest first.
    pub async fn saves(&self) -> Vec<Checkpoint<C>> {
        self.saves.lock().await.clone()
    }
}

#[async_trait]
impl<C: Clone + Send + Sync> CheckpointStore<C> for InMemoryCheckpointStore<C> {
    async fn load(&self) -> Result<Option<Checkpoint<C>>> {
        Ok(self.current.lock().await.clone())
    }

    async fn save(&self, checkpoint: &Checkpoint<C>) -> Result<()> {
        *self.current.lock().await = Some(checkpoint.clone());
        self.saves.lock().await.push(checkpoint.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.current.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pk: &str, value: i64) -> InMemoryRecord {
        match json!({ "pk": { "S": pk }, "value": { "N": value.to_string() } }) {
            Value::Object(fields) => fields,
            _ => unreachable!(),
        }
    }

    fn table(name: &str, status: &str) -> TableDescriptor {
        TableDescriptor::from_value(json!({
            "TableName": name,
            "TableStatus": status,
            "KeySchema": [{ "AttributeName": "pk", "KeyType": "HASH" }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_scan_pages_through_records() {
        let service = InMemoryTableService::new().with_page_size(2);
        service
            .insert_table(
                table("t", "ACTIVE"),
                vec![record("a", 1), record("b", 2), record("c", 3)],
            )
            .await;

        let first = service.scan("t", None).await.unwrap();
        assert_eq!(first.records.len(), 2);
        assert_eq!(first.cursor, Some(2));

        let second = service.scan("t", first.cursor.as_ref()).await.unwrap();
        assert_eq!(second.records, vec![record("c", 3)]);
        assert_eq!(second.cursor, None);
    }

    #[tokio::test]
    async fn test_put_upserts_by_primary_key() {
        let service = InMemoryTableService::new();
        service.insert_table(table("t", "ACTIVE"), vec![]).await;

        service.put("t", &record("a", 1)).await.unwrap();
        service.put("t", &record("b", 2)).await.unwrap();
        service.put("t", &record("a", 3)).await.unwrap();

        assert_eq!(
            service.records("t").await,
            vec![record("a", 3), record("b", 2)]
        );
    }

    #[tokio::test]
    async fn test_created_table_becomes_active_after_polls() {
        let service = InMemoryTableService::new().with_activation_polls(2);
        let request = CreationRequest::new(
            match json!({ "TableName": "t", "BillingMode": "PROVISIONED" }) {
                Value::Object(fields) => fields,
                _ => unreachable!(),
            },
        );

        service.create_table(&request).await.unwrap();

        let first = service.describe_table("t").await.unwrap().unwrap();
        assert_eq!(first.status(), Some(TableStatus::Creating));
        let second = service.describe_table("t").await.unwrap().unwrap();
        assert_eq!(second.status(), Some(TableStatus::Active));
        assert_eq!(
            second.billing_mode_summary(),
            Some(crate::table::BillingMode::Provisioned)
        );
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let service = InMemoryTableService::new();
        service
            .inject(
                Operation::Describe,
                ServiceError::Throttled("slow down".to_string()),
                1,
            )
            .await;

        assert!(service.describe_table("t").await.is_err());
        assert_eq!(service.describe_table("t").await, Ok(None));
    }

    #[tokio::test]
    async fn test_fail_puts_after() {
        let service = InMemoryTableService::new();
        service.insert_table(table("t", "ACTIVE"), vec![]).await;
        service.fail_puts_after(1).await;

        assert!(service.put("t", &record("a", 1)).await.is_ok());
        assert!(service.put("t", &record("b", 2)).await.is_err());

        service.clear_failures().await;
        assert!(service.put("t", &record("b", 2)).await.is_ok());
    }
}
