//! Checkpoint management: which pages have fully completed conversion.

mod persistence;
mod types;

pub use persistence::{compute_document_hash, load, save};
pub use types::CheckpointRecord;

/// Default checkpoint file name inside the output directory.
pub const CHECKPOINT_FILE: &str = "progress.json";
