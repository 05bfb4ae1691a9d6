//! Drive data structures and operations
//!
//! A drive is a tree of [`File`] nodes stored in a node repository,
//! with file content kept as versioned blobs in a [`BlobStore`](crate::blobs::BlobStore).
//!
//! - **[`File`]**: a directory or a content-bearing leaf, with owner, group, mode,
//!   shares and an append-only audit log of [`Activity`] entries
//! - **[`Permissions`]**: read/write/delete/rename evaluation for a [`Subject`]
//! - **[`DriveStore`]**: reads, traversal, root resolution and the serialized
//!   structural mutations (open root, mkdir, put, delete, rename)
//! - **[`Drive`]**: a resolved root in the global or a private [`Namespace`]
//!
//! # Layout
//!
//! ```text
//!   global registry            user registry
//!   name -> root               user -> { name -> root }
//!        |                          |
//!        +------------+-------------+
//!                     |
//!                 Root (dir, no parent)
//!                     |
//!         +-----------+-----------+
//!         |                       |
//!       docs (dir)             a.txt (file)
//!         |                       |
//!      n.txt (file)        VersionAdded -> blob
//! ```
//!
//! Children point at their parent by id and directories list their
//! children by id. Neither side is enforced; stale ids are skipped
//! on read.

mod activity;
mod attributes;
mod content;
mod delete;
mod error;
mod ids;
mod maybe_mime;
mod mkdir;
mod mode;
mod name;
mod node;
mod open_root;
mod permission;
mod put;
mod registry;
mod rename;
mod resolve;
mod share;
mod sniff;
mod store;
mod tree;
mod walk;
mod zip_export;

pub use activity::{Activity, ActivityKind, Stamp};
pub use content::{Content, ContentInfo, VersionSource, HASH_ALGORITHM};
pub use delete::DeleteOptions;
pub use error::{DriveError, ErrorKind};
pub use ids::{BlobKey, Fid, GroupId, UserId};
pub use maybe_mime::MaybeMime;
pub use mkdir::CreateOptions;
pub use mode::{Access, Mode};
pub use name::{is_valid_filename, validate_filename, MAX_FILENAME_LEN};
pub use node::{File, Version};
pub use open_root::{OpenOptions, RootTarget, DEFAULT_ROOT_NAME};
pub use permission::{Permissions, Subject};
pub use put::PutOptions;
pub use registry::{Drive, NamedRoot, Namespace, UserRoots};
pub use share::{Share, ShareToken};
pub use sniff::sniff;
pub use store::{DriveStore, DriveStoreBuilder};
pub use tree::{
    apply_standard_entry_order, find_child_by_name, load_children, path_of,
    standard_entry_order, MAX_PARENT_HOPS,
};
pub use walk::walk_dir;
pub use zip_export::ZipSummary;
