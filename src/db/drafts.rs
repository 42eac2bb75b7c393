use crate::draft::DraftStorage;
use crate::error::StorageError;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Draft storage backed by a local SQLite file.
#[derive(Debug)]
pub struct SqliteDraftStorage {
    conn: Mutex<Connection>,
}

impl SqliteDraftStorage {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = super::init_db(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl DraftStorage for SqliteDraftStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Unavailable)?;
        let value = conn
            .query_row("SELECT value FROM drafts WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Unavailable)?;
        let updated_at = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO drafts (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, updated_at],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Unavailable)?;
        conn.execute("DELETE FROM drafts WHERE key = ?", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_remove() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = SqliteDraftStorage::open(&temp_dir.path().join("test.db")).unwrap();

        assert!(storage.load("quiz_progress_1").unwrap().is_none());

        storage.save("quiz_progress_1", r#"{"5":{"type":"choice","value":12}}"#).unwrap();
        assert_eq!(
            storage.load("quiz_progress_1").unwrap().as_deref(),
            Some(r#"{"5":{"type":"choice","value":12}}"#)
        );

        storage.remove("quiz_progress_1").unwrap();
        assert!(storage.load("quiz_progress_1").unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_existing_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = SqliteDraftStorage::open(&temp_dir.path().join("test.db")).unwrap();

        storage.save("k", "first").unwrap();
        storage.save("k", "second").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_drafts_survive_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("test.db");
        {
            let storage = SqliteDraftStorage::open(&path).unwrap();
            storage.save("quiz_progress_9", "{}").unwrap();
        }
        let storage = SqliteDraftStorage::open(&path).unwrap();
        assert_eq!(storage.load("quiz_progress_9").unwrap().as_deref(), Some("{}"));
    }
}
