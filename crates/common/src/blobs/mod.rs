//! Content blob storage
//!
//! Every version of a file's bytes lives in a [`BlobStore`] under an
//! opaque [`BlobKey`](crate::drive::BlobKey). Nodes only ever hold keys.
//!
//! - **[`MemoryBlobStore`]**: process-local, for tests and embedders
//! - **[`FsBlobStore`]**: one file per blob under a directory; exposes
//!   [`BlobStore::local_file`] so sniffing can read the file directly

mod fs;
mod memory;
mod store;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use store::{BlobReader, BlobStore, BlobStoreError};
