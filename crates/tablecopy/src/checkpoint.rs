//! Copy progress persisted to a JSON file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tablecopy_core::copy::{Checkpoint, CheckpointStore};
use tablecopy_core::{CopyError, Result};

use crate::dynamodb::{decode_key, encode_key, Item};

#[derive(Debug, Serialize, Deserialize)]
struct CheckpointFile {
    source: String,
    destination: String,
    cursor: Value,
    pages: u64,
    records: u64,
    updated_at: DateTime<Utc>,
}

/// Stores the checkpoint of one source/destination pair in a file.
///
/// A file written for a different pair is rejected rather than resumed.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
    source: String,
    destination: String,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>, source: &str, destination: &str) -> Self {
        Self {
            path: path.into(),
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".tmp");
        PathBuf::from(path)
    }

    fn error(&self, action: &str, reason: impl std::fmt::Display) -> CopyError {
        CopyError::Checkpoint(format!(
            "Failed to {} {}: {}",
            action,
            self.path.display(),
            reason
        ))
    }
}

#[async_trait]
impl CheckpointStore<Item> for FileCheckpointStore {
    async fn load(&self) -> Result<Option<Checkpoint<Item>>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.error("read", err)),
        };

        let file: CheckpointFile =
            serde_json::from_str(&contents).map_err(|e| self.error("parse", e))?;

        if file.source != self.source || file.destination != self.destination {
            return Err(self.error(
                "resume from",
                format!(
                    "it belongs to '{}' -> '{}', not '{}' -> '{}'",
                    file.source, file.destination, self.source, self.destination
                ),
            ));
        }

        let cursor = decode_key(&file.cursor).map_err(|e| self.error("decode cursor in", e))?;
        tracing::debug!(
            path = %self.path.display(),
            updated_at = %file.updated_at.to_rfc3339(),
            "Loaded checkpoint"
        );

        Ok(Some(Checkpoint {
            cursor,
            pages: file.pages,
            records: file.records,
        }))
    }

    async fn save(&self, checkpoint: &Checkpoint<Item>) -> Result<()> {
        let file = CheckpointFile {
            source: self.source.clone(),
            destination: self.destination.clone(),
            cursor: encode_key(&checkpoint.cursor)
                .map_err(|e| self.error("encode cursor for", e))?,
            pages: checkpoint.pages,
            records: checkpoint.records,
            updated_at: Utc::now(),
        };
        let contents =
            serde_json::to_string_pretty(&file).map_err(|e| self.error("serialize", e))?;

        // An interrupted save leaves the previous checkpoint intact.
        let temp = self.temp_path();
        tokio::fs::write(&temp, contents)
            .await
            .map_err(|e| self.error("write", e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.error("write", e))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.error("remove", err)),
        }
    }
}
