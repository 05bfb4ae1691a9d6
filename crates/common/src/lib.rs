/**
 * Access control collaborators.
 *  - Resource-ACL contract consulted by the permission evaluator
 *  - Deny-all and in-memory grant table implementations
 */
pub mod acl;
/**
 * Content blob storage.
 * Opaque-keyed binary storage holding every version
 *  of every file's bytes, with in-memory and
 *  filesystem backends.
 */
pub mod blobs;
/**
 * The drive itself: nodes, audit history, permissions,
 *  traversal, root resolution and the mutation
 *  coordinator that ties them together.
 */
pub mod drive;
/**
 * Domain events emitted after successful mutations.
 */
pub mod events;
/**
 * Persistence contracts for nodes and root registries.
 *  Just a light key/value abstraction with in-memory
 *  and JSON-on-disk implementations.
 */
pub mod repository;

pub mod prelude {
    pub use crate::acl::{AclPermission, DenyAllAcl, ResourceAcl, StaticAcl};
    pub use crate::blobs::{BlobStore, FsBlobStore, MemoryBlobStore};
    pub use crate::drive::{
        Activity, Content, ContentInfo, Drive, DriveError, DriveStore, ErrorKind, Fid, File,
        GroupId, Mode, Namespace, Share, Subject, UserId,
    };
    pub use crate::events::{ChannelPublisher, DomainEvent, EventPublisher};
    pub use crate::repository::{FsRepository, MemoryRepository, Repository};
}
