use std::fmt;

use super::ids::Fid;
use crate::acl::AclError;
use crate::blobs::BlobStoreError;
use crate::repository::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("parent chain of {0} does not terminate at a root")]
    CycleDetected(Fid),
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("blob store error: {0}")]
    BlobStore(BlobStoreError),
    #[error("acl backend error: {0}")]
    Acl(anyhow::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`DriveError`] for calling layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    InvalidArgument,
    Infrastructure,
}

impl DriveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriveError::NotFound(_) => ErrorKind::NotFound,
            DriveError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            DriveError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            DriveError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            DriveError::CycleDetected(_)
            | DriveError::Repository(_)
            | DriveError::BlobStore(_)
            | DriveError::Acl(_)
            | DriveError::Zip(_)
            | DriveError::Io(_) => ErrorKind::Infrastructure,
        }
    }

    pub(crate) fn denied(what: impl fmt::Display) -> Self {
        DriveError::PermissionDenied(what.to_string())
    }

    pub(crate) fn not_found(what: impl fmt::Display) -> Self {
        DriveError::NotFound(what.to_string())
    }
}

impl From<BlobStoreError> for DriveError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::AlreadyExists(key) => {
                DriveError::AlreadyExists(format!("blob {}", key))
            }
            other => DriveError::BlobStore(other),
        }
    }
}

impl From<AclError> for DriveError {
    fn from(err: AclError) -> Self {
        match err {
            denied @ AclError::Denied { .. } => DriveError::PermissionDenied(denied.to_string()),
            AclError::Backend(err) => DriveError::Acl(err),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::PermissionDenied => "permission denied",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::Infrastructure => "infrastructure",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::AclPermission;
    use crate::drive::{BlobKey, UserId};

    #[test]
    fn test_blob_collision_is_already_exists() {
        let err: DriveError = BlobStoreError::AlreadyExists(BlobKey::from("k")).into();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_acl_denial_is_permission_denied() {
        let err: DriveError = AclError::Denied {
            subject: UserId::from("bob"),
            namespace: "drive.file".to_string(),
            instance: "x".to_string(),
            permission: AclPermission::Read,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        let err: DriveError = AclError::Backend(anyhow::anyhow!("down")).into();
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
    }
}
