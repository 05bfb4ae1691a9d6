use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::DriveError;
use super::ids::BlobKey;
use super::maybe_mime::MaybeMime;
use crate::blobs::{BlobReader, BlobStore};

pub const HASH_ALGORITHM: &str = "sha256";

/// Describes one stored version of a file's bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentInfo {
    pub original_filename: String,
    pub key: BlobKey,
    /// Hex encoded digest of the blob
    pub hash: String,
    pub hash_algorithm: String,
    pub size: u64,
    pub mime: MaybeMime,
}

/// Where a content version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSource {
    #[default]
    Unknown,
    Upload,
    Derived,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSource::Unknown => f.write_str("unknown"),
            VersionSource::Upload => f.write_str("upload"),
            VersionSource::Derived => f.write_str("derived"),
        }
    }
}

/// Readable handle on one content version, handed out to callers
#[derive(Clone)]
pub struct Content {
    name: String,
    info: ContentInfo,
    blobs: Arc<dyn BlobStore>,
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("name", &self.name)
            .field("info", &self.info)
            .finish()
    }
}

impl Content {
    pub(crate) fn new(name: impl Into<String>, info: ContentInfo, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            name: name.into(),
            info,
            blobs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        self.info.mime.as_str()
    }

    pub fn size(&self) -> u64 {
        self.info.size
    }

    pub fn info(&self) -> &ContentInfo {
        &self.info
    }

    pub fn open(&self) -> Result<BlobReader, DriveError> {
        self.blobs
            .reader(&self.info.key)?
            .ok_or_else(|| DriveError::not_found(format!("blob {}", self.info.key)))
    }

    /// Copy the whole version into `writer`, returning the bytes copied
    pub fn transfer(&self, writer: &mut dyn Write) -> Result<u64, DriveError> {
        let mut reader = self.open()?;
        Ok(io::copy(&mut reader, writer)?)
    }
}

/// Passes bytes through while digesting and counting them
pub(crate) struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
    count: u64,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            count: 0,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.count += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blobs::MemoryBlobStore;

    #[test]
    fn test_hashing_reader() {
        let mut reader = HashingReader::new(&b"hello"[..]);
        let mut sink = Vec::new();
        io::copy(&mut reader, &mut sink).unwrap();
        assert_eq!(reader.count(), 5);
        assert_eq!(
            reader.finish(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_content_transfer() {
        let blobs = MemoryBlobStore::default();
        let key = BlobKey::from("k1");
        blobs.write(&key, &mut &b"payload"[..]).unwrap();

        let content = Content::new(
            "a.bin",
            ContentInfo {
                original_filename: "a.bin".to_string(),
                key,
                hash: String::new(),
                hash_algorithm: HASH_ALGORITHM.to_string(),
                size: 7,
                mime: MaybeMime(None),
            },
            Arc::new(blobs),
        );

        let mut out = Vec::new();
        assert_eq!(content.transfer(&mut out).unwrap(), 7);
        assert_eq!(out, b"payload");
        assert_eq!(content.mime_type(), "application/octet-stream");
        assert_eq!(content.name(), "a.bin");
    }

    #[test]
    fn test_missing_blob_is_not_found() {
        let content = Content::new(
            "gone",
            ContentInfo {
                original_filename: "gone".to_string(),
                key: BlobKey::from("missing"),
                hash: String::new(),
                hash_algorithm: HASH_ALGORITHM.to_string(),
                size: 0,
                mime: MaybeMime(None),
            },
            Arc::new(MemoryBlobStore::default()),
        );
        assert!(matches!(content.open(), Err(DriveError::NotFound(_))));
    }
}
