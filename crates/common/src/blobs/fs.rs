use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use super::store::{BlobReader, BlobStore, BlobStoreError};
use crate::drive::BlobKey;

/// Blob store keeping one file per blob in a directory
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    dir: PathBuf,
}

impl FsBlobStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, BlobStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!("FsBlobStore::open: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &BlobKey) -> Result<PathBuf, BlobStoreError> {
        let valid = !key.as_str().is_empty()
            && key
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(BlobStoreError::InvalidKey(key.clone()));
        }
        Ok(self.dir.join(key.as_str()))
    }
}

impl BlobStore for FsBlobStore {
    fn exists(&self, key: &BlobKey) -> Result<bool, BlobStoreError> {
        Ok(self.path_for(key)?.is_file())
    }

    fn reader(&self, key: &BlobKey) -> Result<Option<BlobReader>, BlobStoreError> {
        match File::open(self.path_for(key)?) {
            Ok(file) => Ok(Some(Box::new(file))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &BlobKey, data: &mut dyn Read) -> Result<u64, BlobStoreError> {
        let path = self.path_for(key)?;
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(BlobStoreError::AlreadyExists(key.clone()))
            }
            Err(err) => return Err(err.into()),
        };

        let mut writer = BufWriter::new(file);
        let result = io::copy(data, &mut writer).and_then(|n| writer.flush().map(|_| n));
        match result {
            Ok(written) => Ok(written),
            Err(err) => {
                tracing::error!("FsBlobStore::write: failed writing blob {}: {}", key, err);
                let _ = fs::remove_file(&path);
                Err(err.into())
            }
        }
    }

    fn delete(&self, key: &BlobKey) -> Result<(), BlobStoreError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn local_file(&self, key: &BlobKey) -> Option<PathBuf> {
        self.path_for(key).ok().filter(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_fs_blob_lifecycle() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FsBlobStore::open(temp.path().join("blobs")).unwrap();
        let key = BlobKey::generate();

        assert!(!store.exists(&key).unwrap());
        assert!(store.local_file(&key).is_none());

        let written = store
            .write(&key, &mut Cursor::new(vec![7u8; 4096]))
            .unwrap();
        assert_eq!(written, 4096);
        assert!(store.exists(&key).unwrap());

        let local = store.local_file(&key).unwrap();
        assert_eq!(fs::metadata(local).unwrap().len(), 4096);

        let again = store.write(&key, &mut Cursor::new(b"x"));
        assert!(matches!(again, Err(BlobStoreError::AlreadyExists(_))));

        store.delete(&key).unwrap();
        store.delete(&key).unwrap();
        assert!(store.reader(&key).unwrap().is_none());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FsBlobStore::open(temp.path()).unwrap();
        let key = BlobKey::from("../escape");
        assert!(matches!(
            store.exists(&key),
            Err(BlobStoreError::InvalidKey(_))
        ));
    }
}
