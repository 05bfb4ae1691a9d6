use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, RwLock};

use super::store::{BlobReader, BlobStore, BlobStoreError};
use crate::drive::BlobKey;

/// In-memory blob store
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<RwLock<HashMap<BlobKey, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(err: impl std::fmt::Display) -> BlobStoreError {
    BlobStoreError::Poisoned(format!("failed to acquire lock: {}", err))
}

impl BlobStore for MemoryBlobStore {
    fn exists(&self, key: &BlobKey) -> Result<bool, BlobStoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.contains_key(key))
    }

    fn reader(&self, key: &BlobKey) -> Result<Option<BlobReader>, BlobStoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .get(key)
            .map(|data| Box::new(Cursor::new(data.clone())) as BlobReader))
    }

    fn write(&self, key: &BlobKey, data: &mut dyn Read) -> Result<u64, BlobStoreError> {
        // buffer outside the lock, the stream may be slow
        let mut buf = Vec::new();
        data.read_to_end(&mut buf)?;

        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.contains_key(key) {
            return Err(BlobStoreError::AlreadyExists(key.clone()));
        }
        let size = buf.len() as u64;
        inner.insert(key.clone(), buf);
        Ok(size)
    }

    fn delete(&self, key: &BlobKey) -> Result<(), BlobStoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_delete() {
        let store = MemoryBlobStore::new();
        let key = BlobKey::generate();

        let written = store.write(&key, &mut Cursor::new(b"hello")).unwrap();
        assert_eq!(written, 5);
        assert!(store.exists(&key).unwrap());

        let mut out = String::new();
        store
            .reader(&key)
            .unwrap()
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "hello");

        store.delete(&key).unwrap();
        assert!(!store.exists(&key).unwrap());
        assert!(store.reader(&key).unwrap().is_none());
        assert!(store.local_file(&key).is_none());
    }

    #[test]
    fn test_write_existing_key_fails() {
        let store = MemoryBlobStore::new();
        let key = BlobKey::generate();
        store.write(&key, &mut Cursor::new(b"a")).unwrap();
        let result = store.write(&key, &mut Cursor::new(b"b"));
        assert!(matches!(result, Err(BlobStoreError::AlreadyExists(_))));
    }
}
