use std::collections::HashSet;
use std::fmt;
use std::fmt::Debug;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::drive::{Subject, UserId};

/// Namespace for per-node grants, instance is the node id
pub const FILE_NAMESPACE: &str = "drive.file";
/// Namespace for opening global roots, instance is the root name
pub const GLOBAL_ROOT_NAMESPACE: &str = "drive.root.global";
/// Namespace for opening private roots, instance is the owning user id
pub const PRIVATE_ROOT_NAMESPACE: &str = "drive.root.private";

/// Permission tokens understood by the resource-ACL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclPermission {
    Read,
    Write,
    Delete,
    Rename,
    MkDir,
    Open,
}

impl AclPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            AclPermission::Read => "read",
            AclPermission::Write => "write",
            AclPermission::Delete => "delete",
            AclPermission::Rename => "rename",
            AclPermission::MkDir => "mkdir",
            AclPermission::Open => "open",
        }
    }
}

impl fmt::Display for AclPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AclError {
    #[error("{subject} lacks {permission} on {namespace}/{instance}")]
    Denied {
        subject: UserId,
        namespace: String,
        instance: String,
        permission: AclPermission,
    },
    #[error("acl backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Fine grained per-resource grants, consulted after the mode bits
pub trait ResourceAcl: Send + Sync + Debug {
    fn has_resource_permission(
        &self,
        subject: &Subject,
        namespace: &str,
        instance: &str,
        permission: AclPermission,
    ) -> Result<bool, AclError>;

    /// Like [`ResourceAcl::has_resource_permission`], but a denial is an error
    fn audit_resource_permission(
        &self,
        subject: &Subject,
        namespace: &str,
        instance: &str,
        permission: AclPermission,
    ) -> Result<(), AclError> {
        if self.has_resource_permission(subject, namespace, instance, permission)? {
            return Ok(());
        }
        tracing::info!(
            subject = %subject.id,
            namespace,
            instance,
            permission = %permission,
            "resource acl denied"
        );
        Err(AclError::Denied {
            subject: subject.id.clone(),
            namespace: namespace.to_string(),
            instance: instance.to_string(),
            permission,
        })
    }
}

/// Grants nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllAcl;

impl ResourceAcl for DenyAllAcl {
    fn has_resource_permission(
        &self,
        _subject: &Subject,
        _namespace: &str,
        _instance: &str,
        _permission: AclPermission,
    ) -> Result<bool, AclError> {
        Ok(false)
    }
}

type Grant = (UserId, String, String, AclPermission);

/// In-memory grant table
#[derive(Debug, Default)]
pub struct StaticAcl {
    grants: RwLock<HashSet<Grant>>,
}

impl StaticAcl {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(user: &UserId, namespace: &str, instance: &str, permission: AclPermission) -> Grant {
        (
            user.clone(),
            namespace.to_string(),
            instance.to_string(),
            permission,
        )
    }

    pub fn grant(
        &self,
        user: &UserId,
        namespace: &str,
        instance: &str,
        permission: AclPermission,
    ) -> Result<(), AclError> {
        let mut grants = self.grants.write().map_err(poisoned)?;
        grants.insert(Self::key(user, namespace, instance, permission));
        Ok(())
    }

    pub fn revoke(
        &self,
        user: &UserId,
        namespace: &str,
        instance: &str,
        permission: AclPermission,
    ) -> Result<(), AclError> {
        let mut grants = self.grants.write().map_err(poisoned)?;
        grants.remove(&Self::key(user, namespace, instance, permission));
        Ok(())
    }
}

fn poisoned(err: impl fmt::Display) -> AclError {
    AclError::Backend(anyhow::anyhow!("failed to acquire lock: {}", err))
}

impl ResourceAcl for StaticAcl {
    fn has_resource_permission(
        &self,
        subject: &Subject,
        namespace: &str,
        instance: &str,
        permission: AclPermission,
    ) -> Result<bool, AclError> {
        let grants = self.grants.read().map_err(poisoned)?;
        Ok(grants.contains(&Self::key(&subject.id, namespace, instance, permission)))
    }
}
