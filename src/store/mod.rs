//! Persistence seams for submitted recordings
//!
//! - `ObjectStore`: binary WAV objects (Cloud Storage in production)
//! - `RecordingStore`: append-only metadata documents (Firestore in production)
//!
//! `memory` holds in-process implementations used by tests and local runs.

pub mod memory;
mod models;

pub use memory::{MemoryObjectStore, MemoryRecordingStore};
pub use models::{Rating, RecordingMetadata};

use anyhow::Result;
use std::collections::HashSet;

/// Content type of every uploaded recording
pub const WAV_CONTENT_TYPE: &str = "audio/wav";

/// Key prefix of every uploaded recording
pub const AUDIO_PREFIX: &str = "audio/";

/// Binary object storage
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing object
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Remove the object under `key`
    async fn delete(&self, key: &str) -> Result<()>;

    /// Store name for logging
    fn name(&self) -> &str;
}

/// Metadata document storage
#[async_trait::async_trait]
pub trait RecordingStore: Send + Sync {
    /// Prompts `user_id` already has a record for
    async fn completed_prompts(&self, user_id: &str) -> Result<HashSet<String>>;

    /// Append one record; the store assigns the timestamp. Returns the document ID.
    async fn append(&self, record: &RecordingMetadata) -> Result<String>;

    /// Store name for logging
    fn name(&self) -> &str;
}
