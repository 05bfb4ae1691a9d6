//! Persistence contracts
//!
//! The drive never owns its storage. Nodes and both root registries are
//! reached through the [`Repository`] contract, injected when a
//! [`DriveStore`](crate::drive::DriveStore) is built:
//!
//! - **[`MemoryRepository`]**: process-local maps, used by tests and embedders
//! - **[`FsRepository`]**: one JSON document per entity under a directory
//!
//! Each single `save` / `delete_by_id` is atomic with respect to readers.
//! Nothing spans more than one entity.

mod fs;
mod memory;
mod provider;

pub use fs::FsRepository;
pub use memory::MemoryRepository;
pub use provider::{Entity, Repository, RepositoryError};
