use std::fmt::Debug;
use std::io::Read;
use std::path::PathBuf;

use crate::drive::BlobKey;

pub type BlobReader = Box<dyn Read + Send>;

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("blob store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("blob already exists: {0}")]
    AlreadyExists(BlobKey),
    #[error("invalid blob key: {0}")]
    InvalidKey(BlobKey),
    #[error("blob store lock poisoned: {0}")]
    Poisoned(String),
}

/// Binary storage addressed by opaque keys.
///
/// Writes never overwrite: a key is written exactly once and
///  later removed with [`BlobStore::delete`].
pub trait BlobStore: Send + Sync + Debug {
    fn exists(&self, key: &BlobKey) -> Result<bool, BlobStoreError>;

    /// Open a blob for reading, `Ok(None)` if it does not exist
    fn reader(&self, key: &BlobKey) -> Result<Option<BlobReader>, BlobStoreError>;

    /// Stream `data` into a new blob, returning the number of bytes written
    fn write(&self, key: &BlobKey, data: &mut dyn Read) -> Result<u64, BlobStoreError>;

    /// Remove a blob. Removing a missing key is not an error.
    fn delete(&self, key: &BlobKey) -> Result<(), BlobStoreError>;

    /// Path of the blob on the local filesystem, for backends that have one
    fn local_file(&self, _key: &BlobKey) -> Option<PathBuf> {
        None
    }
}
