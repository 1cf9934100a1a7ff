use anyhow::{anyhow, Result};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{ObjectStore, RecordingMetadata, RecordingStore};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Object store kept in process memory
///
/// A fault set with `fail_with` makes every following call fail with that
/// message until `clear_fault` is called.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    fault: Mutex<Option<String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *lock(&self.fault) = Some(message.into());
    }

    pub fn clear_fault(&self) {
        *lock(&self.fault) = None;
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        lock(&self.objects).get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = lock(&self.objects).keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_fault(&self) -> Result<()> {
        match lock(&self.fault).as_ref() {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.check_fault()?;
        lock(&self.objects).insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_fault()?;
        lock(&self.objects).remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Recording metadata kept in process memory
#[derive(Default)]
pub struct MemoryRecordingStore {
    records: Mutex<Vec<(String, RecordingMetadata)>>,
    fault: Mutex<Option<String>>,
}

impl MemoryRecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *lock(&self.fault) = Some(message.into());
    }

    pub fn clear_fault(&self) {
        *lock(&self.fault) = None;
    }

    /// Insert a record directly, bypassing fault injection
    pub fn seed(&self, record: RecordingMetadata) {
        let id = uuid::Uuid::new_v4().to_string();
        lock(&self.records).push((id, record));
    }

    pub fn records_for(&self, user_id: &str) -> Vec<RecordingMetadata> {
        lock(&self.records)
            .iter()
            .filter(|(_, r)| r.user_id == user_id)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl RecordingStore for MemoryRecordingStore {
    async fn completed_prompts(&self, user_id: &str) -> Result<HashSet<String>> {
        if let Some(message) = lock(&self.fault).as_ref() {
            return Err(anyhow!(message.clone()));
        }
        Ok(lock(&self.records)
            .iter()
            .filter(|(_, r)| r.user_id == user_id)
            .map(|(_, r)| r.text_prompt.clone())
            .collect())
    }

    async fn append(&self, record: &RecordingMetadata) -> Result<String> {
        if let Some(message) = lock(&self.fault).as_ref() {
            return Err(anyhow!(message.clone()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let mut stored = record.clone();
        stored.timestamp = Some(Utc::now());
        lock(&self.records).push((id.clone(), stored));
        Ok(id)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// A panic while holding one of these locks cannot leave the maps half-written
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
