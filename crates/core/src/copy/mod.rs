mod checkpoint;
mod engine;

pub use checkpoint::{Checkpoint, CheckpointStore, NoCheckpoint};
pub use engine::{CopyEngine, CopyStats};
