//! Core of tablecopy: copies the schema and the records of one table into
//! another, independent of the service that hosts them.
//!
//! - [`schema`]: attribute templates and description filtering.
//! - [`table`]: table descriptions and the service traits.
//! - [`provision`]: creating the destination table and waiting for it.
//! - [`copy`]: paginated, checkpointed record copy.
//! - [`orchestrator`]: runs both phases for a table pair.

pub mod copy;
pub mod error;
pub mod orchestrator;
pub mod provision;
pub mod retry;
pub mod schema;
pub mod table;

#[cfg(any(test, feature = "inmemory"))]
pub mod inmemory;

pub use error::{CopyError, Result};
