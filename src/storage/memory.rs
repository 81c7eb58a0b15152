//! In-memory record store.

use super::{RecordKey, RecordStore};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Keeps records in a map; nothing touches the disk.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<RecordKey, String>>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys of every stored record, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn keys(&self) -> Result<Vec<RecordKey>> {
        let records = self.records.read().map_err(|_| poisoned("list_records"))?;
        Ok(records.keys().cloned().collect())
    }
}

fn poisoned(operation: &str) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: "Lock poisoned".to_string(),
    }
}

fn check(key: &RecordKey) -> Result<()> {
    if key.is_safe() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "record key contains invalid characters: {key}"
        )))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn read(&self, key: &RecordKey) -> Result<Option<String>> {
        check(key)?;
        let records = self.records.read().map_err(|_| poisoned("read_record"))?;
        Ok(records.get(key).cloned())
    }

    fn write(&self, key: &RecordKey, text: &str) -> Result<()> {
        check(key)?;
        let mut records = self.records.write().map_err(|_| poisoned("write_record"))?;
        records.insert(key.clone(), text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_and_list() {
        let store = InMemoryRecordStore::new();
        let key = RecordKey::new("Omar.hero_1");
        assert_eq!(store.read(&key).unwrap(), None);
        store.write(&key, "Valor=1\n").unwrap();
        assert!(store.exists(&key).unwrap());
        assert_eq!(store.read(&key).unwrap().as_deref(), Some("Valor=1\n"));
        assert_eq!(store.keys().unwrap(), [key]);
    }

    #[test]
    fn test_unsafe_key_rejected() {
        let store = InMemoryRecordStore::new();
        assert!(store.write(&RecordKey::new("../x"), "").is_err());
    }
}
