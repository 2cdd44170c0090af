//! Errors raised while provisioning or copying a table.

use std::time::Duration;

use thiserror::Error;

use crate::schema::SchemaError;
use crate::table::{ServiceError, TableStatus};

/// Errors that abort a provisioning or copy run.
///
/// None of these are retried; throttling is handled below this level by
/// [`crate::retry::with_backoff`].
#[derive(Debug, Error, PartialEq)]
pub enum CopyError {
    #[error("Source table '{table_name}' not found")]
    SourceNotFound { table_name: String },

    #[error("Destination table '{table_name}' already exists with status {status}")]
    InconsistentDestination {
        table_name: String,
        status: TableStatus,
    },

    #[error("Source table '{table_name}' has status {status}, expected ACTIVE")]
    InvalidSourceState {
        table_name: String,
        status: TableStatus,
    },

    #[error("Table '{table_name}' is not ACTIVE ({observed}), refusing to copy data")]
    TableNotActive {
        table_name: String,
        observed: String,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to describe table '{table_name}'")]
    DescribeFailure {
        table_name: String,
        #[source]
        source: ServiceError,
    },

    #[error("Failed to create table '{table_name}'")]
    CreateFailure {
        table_name: String,
        #[source]
        source: ServiceError,
    },

    #[error("Table '{table_name}' entered status {status} while waiting for ACTIVE")]
    PollFailure {
        table_name: String,
        status: TableStatus,
    },

    #[error("Timed out after {waited:?} waiting for table '{table_name}' to become ACTIVE")]
    PollTimeout {
        table_name: String,
        waited: Duration,
    },

    #[error("Failed to scan table '{table_name}'")]
    ScanFailure {
        table_name: String,
        #[source]
        source: ServiceError,
    },

    #[error("Failed to write record to table '{table_name}'")]
    WriteFailure {
        table_name: String,
        #[source]
        source: ServiceError,
    },

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),
}

/// Result type for provisioning and copy operations.
pub type Result<T> = std::result::Result<T, CopyError>;
