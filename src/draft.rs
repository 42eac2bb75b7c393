use crate::error::StorageError;
use crate::models::SlideId;
use std::collections::HashMap;
use std::sync::Mutex;

/// Client-local key/value storage for unsubmitted answers.
pub trait DraftStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub fn draft_key(slide_id: SlideId) -> String {
    format!("quiz_progress_{}", slide_id)
}

/// Process-local storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryDraftStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryDraftStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStorage for MemoryDraftStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        entries.remove(key);
        Ok(())
    }
}
