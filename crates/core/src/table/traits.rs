use async_trait::async_trait;

use super::{CreationRequest, ScanPage, ServiceResult, TableDescriptor};

/// Remote API that describes, creates and tracks the lifecycle of tables.
#[async_trait]
pub trait TableControl: Send + Sync {
    /// Describes a table. Returns `None` if it does not exist.
    async fn describe_table(&self, table_name: &str) -> ServiceResult<Option<TableDescriptor>>;

    /// Starts creating a table. The service provisions it asynchronously.
    async fn create_table(&self, request: &CreationRequest) -> ServiceResult<()>;
}

/// Remote API that reads and writes individual records.
#[async_trait]
pub trait TableData: Send + Sync {
    /// One opaque item, passed through unmodified.
    type Record: Send + Sync;

    /// Continuation token of a paginated scan.
    type Cursor: Clone + Send + Sync;

    /// Reads one page of all attributes, starting after `cursor`.
    async fn scan(
        &self,
        table_name: &str,
        cursor: Option<&Self::Cursor>,
    ) -> ServiceResult<ScanPage<Self::Record, Self::Cursor>>;

    /// Writes one record, replacing any record with the same primary key.
    async fn put(&self, table_name: &str, record: &Self::Record) -> ServiceResult<()>;
}
