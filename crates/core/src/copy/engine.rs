//! Paginated bulk copy from one table to another.

use super::checkpoint::{Checkpoint, CheckpointStore};
use crate::error::{CopyError, Result};
use crate::retry::{with_backoff, RetryPolicy};
use crate::table::TableData;

/// Totals of a finished copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Pages scanned, including those applied before a resume.
    pub pages: u64,
    /// Records written, including those applied before a resume.
    pub records: u64,
    /// Whether the copy started from a stored checkpoint.
    pub resumed: bool,
}

/// Copies every record of a table, one page at a time.
///
/// Pages are processed strictly in cursor order and every record of a page
/// is written, one call per record, before the next page is requested. The
/// first scan or write failure aborts the copy.
pub struct CopyEngine<'a, D: TableData + ?Sized> {
    data: &'a D,
    retry: RetryPolicy,
}

impl<'a, D: TableData + ?Sized> CopyEngine<'a, D> {
    pub fn new(data: &'a D) -> Self {
        Self {
            data,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Copies all records of `source` into `destination`.
    ///
    /// If `checkpoints` holds a checkpoint the scan resumes from it. A new
    /// checkpoint is saved after each page that has a successor, and the
    /// store is cleared once the last page has been written.
    pub async fn copy_table<S>(
        &self,
        source: &str,
        destination: &str,
        checkpoints: &S,
    ) -> Result<CopyStats>
    where
        S: CheckpointStore<D::Cursor> + ?Sized,
    {
        let mut stats = CopyStats::default();
        let mut cursor = match checkpoints.load().await? {
            Some(checkpoint) => {
                tracing::info!(
                    source,
                    destination,
                    pages = checkpoint.pages,
                    records = checkpoint.records,
                    "Resuming copy from checkpoint"
                );
                stats.pages = checkpoint.pages;
                stats.records = checkpoint.records;
                stats.resumed = true;
                Some(checkpoint.cursor)
            }
            None => None,
        };

        tracing::info!(source, destination, "Copying records");

        loop {
            let page = with_backoff(&self.retry, "Scan", || {
                self.data.scan(source, cursor.as_ref())
            })
            .await
            .map_err(|source_err| CopyError::ScanFailure {
                table_name: source.to_string(),
                source: source_err,
            })?;

            tracing::debug!(
                page = stats.pages + 1,
                records = page.records.len(),
                "Scanned page"
            );

            for record in &page.records {
                with_backoff(&self.retry, "PutItem", || self.data.put(destination, record))
                    .await
                    .map_err(|source_err| CopyError::WriteFailure {
                        table_name: destination.to_string(),
                        source: source_err,
                    })?;
                stats.records += 1;
            }
            stats.pages += 1;

            tracing::info!(
                page = stats.pages,
                page_records = page.records.len(),
                total_records = stats.records,
                "Copied page"
            );

            match page.cursor {
                Some(next) => {
                    checkpoints
                        .save(&Checkpoint {
                            cursor: next.clone(),
                            pages: stats.pages,
                            records: stats.records,
                        })
                        .await?;
                    cursor = Some(next);
                }
                None => break,
            }
        }

        checkpoints.clear().await?;

        tracing::info!(
            source,
            destination,
            pages = stats.pages,
            records = stats.records,
            "Copy completed"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copy::NoCheckpoint;
    use crate::inmemory::{
        Call, InMemoryCheckpointStore, InMemoryRecord, InMemoryTableService, Operation,
    };
    use crate::table::{ServiceError, TableDescriptor};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn record(id: u32) -> InMemoryRecord {
        match json!({
            "id": { "S": format!("order-{id}") },
            "total": { "N": (id * 10).to_string() },
            "tags": { "SS": ["a", "b"] }
        }) {
            Value::Object(fields) => fields,
            _ => unreachable!(),
        }
    }

    fn table(name: &str) -> TableDescriptor {
        TableDescriptor::from_value(json!({
            "TableName": name,
            "TableStatus": "ACTIVE",
            "KeySchema": [{ "AttributeName": "id", "KeyType": "HASH" }]
        }))
        .unwrap()
    }

    async fn service(page_size: usize, records: u32) -> InMemoryTableService {
        let service = InMemoryTableService::new().with_page_size(page_size);
        service
            .insert_table(table("source"), (1..=records).map(record).collect())
            .await;
        service.insert_table(table("destination"), vec![]).await;
        service
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        }
    }

    fn scans(calls: &[Call]) -> Vec<Option<usize>> {
        calls
            .iter()
            .filter_map(|call| match call {
                Call::Scan { cursor, .. } => Some(*cursor),
                _ => None,
            })
            .collect()
    }

    fn puts(calls: &[Call]) -> Vec<InMemoryRecord> {
        calls
            .iter()
            .filter_map(|call| match call {
                Call::Put { record, .. } => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_copies_every_page_in_cursor_order() {
        let service = service(3, 8).await;

        let stats = CopyEngine::new(&service)
            .copy_table("source", "destination", &NoCheckpoint)
            .await
            .unwrap();

        assert_eq!(
            stats,
            CopyStats {
                pages: 3,
                records: 8,
                resumed: false
            }
        );
        let calls = service.calls().await;
        assert_eq!(scans(&calls), vec![None, Some(3), Some(6)]);
        assert_eq!(puts(&calls), (1..=8).map(record).collect::<Vec<_>>());
        assert_eq!(service.records("destination").await, service.records("source").await);
    }

    #[tokio::test]
    async fn test_writes_complete_before_next_scan() {
        let service = service(2, 4).await;

        CopyEngine::new(&service)
            .copy_table("source", "destination", &NoCheckpoint)
            .await
            .unwrap();

        let kinds: Vec<&str> = service
            .calls()
            .await
            .iter()
            .map(|call| match call {
                Call::Scan { .. } => "scan",
                Call::Put { .. } => "put",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["scan", "put", "put", "scan", "put", "put"]);
    }

    #[tokio::test]
    async fn test_empty_source_scans_once() {
        let service = service(10, 0).await;

        let stats = CopyEngine::new(&service)
            .copy_table("source", "destination", &NoCheckpoint)
            .await
            .unwrap();

        assert_eq!(stats.pages, 1);
        assert_eq!(stats.records, 0);
        assert_eq!(scans(&service.calls().await), vec![None]);
    }

    #[tokio::test]
    async fn test_write_failure_aborts_copy() {
        let service = service(3, 6).await;
        service.fail_puts_after(4).await;

        let err = CopyEngine::new(&service)
            .with_retry(fast_retry())
            .copy_table("source", "destination", &NoCheckpoint)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CopyError::WriteFailure { ref table_name, .. } if table_name == "destination"
        ));
        let calls = service.calls().await;
        assert_eq!(scans(&calls), vec![None, Some(3)]);
        assert_eq!(puts(&calls).len(), 5);
        assert_eq!(service.records("destination").await.len(), 4);
    }

    #[tokio::test]
    async fn test_scan_failure_aborts_copy() {
        let service = service(3, 6).await;
        service
            .inject(
                Operation::Scan,
                ServiceError::Failed("AccessDeniedException".to_string()),
                1,
            )
            .await;

        let err = CopyEngine::new(&service)
            .copy_table("source", "destination", &NoCheckpoint)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CopyError::ScanFailure {
                table_name: "source".to_string(),
                source: ServiceError::Failed("AccessDeniedException".to_string()),
            }
        );
        assert!(puts(&service.calls().await).is_empty());
    }

    #[tokio::test]
    async fn test_throttled_put_is_retried() {
        let service = service(5, 2).await;
        service
            .inject(
                Operation::Put,
                ServiceError::Throttled("ProvisionedThroughputExceededException".to_string()),
                2,
            )
            .await;

        let stats = CopyEngine::new(&service)
            .with_retry(fast_retry())
            .copy_table("source", "destination", &NoCheckpoint)
            .await
            .unwrap();

        assert_eq!(stats.records, 2);
        assert_eq!(puts(&service.calls().await).len(), 4);
        assert_eq!(service.records("destination").await.len(), 2);
    }

    #[tokio::test]
    async fn test_checkpoint_saved_per_page_and_cleared_on_success() {
        let service = service(2, 5).await;
        let checkpoints = InMemoryCheckpointStore::new();

        CopyEngine::new(&service)
            .copy_table("source", "destination", &checkpoints)
            .await
            .unwrap();

        let saved: Vec<(usize, u64, u64)> = checkpoints
            .saves()
            .await
            .iter()
            .map(|c| (c.cursor, c.pages, c.records))
            .collect();
        assert_eq!(saved, vec![(2, 1, 2), (4, 2, 4)]);
        assert_eq!(checkpoints.current().await, None);
    }

    #[tokio::test]
    async fn test_resumes_from_last_completed_page() {
        let service = service(2, 5).await;
        let checkpoints = InMemoryCheckpointStore::new();
        service.fail_puts_after(3).await;

        let err = CopyEngine::new(&service)
            .with_retry(fast_retry())
            .copy_table("source", "destination", &checkpoints)
            .await
            .unwrap_err();
        assert!(matches!(err, CopyError::WriteFailure { .. }));
        assert_eq!(
            checkpoints.current().await,
            Some(Checkpoint {
                cursor: 2,
                pages: 1,
                records: 2
            })
        );

        service.clear_failures().await;
        let calls_before = service.calls().await.len();

        let stats = CopyEngine::new(&service)
            .copy_table("source", "destination", &checkpoints)
            .await
            .unwrap();

        assert_eq!(
            stats,
            CopyStats {
                pages: 3,
                records: 5,
                resumed: true
            }
        );
        let resumed_calls = service.calls().await.split_off(calls_before);
        assert_eq!(scans(&resumed_calls), vec![Some(2), Some(4)]);
        assert_eq!(puts(&resumed_calls), (3..=5).map(record).collect::<Vec<_>>());
        assert_eq!(service.records("destination").await.len(), 5);
        assert_eq!(checkpoints.current().await, None);
    }
}
