//! Resumable copy progress.

use async_trait::async_trait;

use crate::error::Result;

/// Progress of a copy after a fully written page.
///
/// `cursor` is the continuation token of the next page to scan; resuming
/// from it never rewrites a page that was already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint<C> {
    pub cursor: C,
    pub pages: u64,
    pub records: u64,
}

/// Persists [`Checkpoint`]s between runs.
#[async_trait]
pub trait CheckpointStore<C: Send + Sync>: Send + Sync {
    /// Returns the checkpoint to resume from, if any.
    async fn load(&self) -> Result<Option<Checkpoint<C>>>;

    /// Replaces the stored checkpoint.
    async fn save(&self, checkpoint: &Checkpoint<C>) -> Result<()>;

    /// Forgets the stored checkpoint once the copy has completed.
    async fn clear(&self) -> Result<()>;
}

/// A store that never remembers anything: every copy starts from the first
/// page.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheckpoint;

#[async_trait]
impl<C: Send + Sync> CheckpointStore<C> for NoCheckpoint {
    async fn load(&self) -> Result<Option<Checkpoint<C>>> {
        Ok(None)
    }

    async fn save(&self, _checkpoint: &Checkpoint<C>) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}
