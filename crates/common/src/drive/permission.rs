use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ids::{GroupId, UserId};
use super::mode::Access;
use super::node::File;
use crate::acl::{AclPermission, ResourceAcl, FILE_NAMESPACE};
use crate::repository::Repository;

/// The acting identity behind every operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: UserId,
    #[serde(default)]
    pub groups: BTreeSet<GroupId>,
    #[serde(default)]
    pub superuser: bool,
}

impl Subject {
    pub fn user(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            groups: BTreeSet::new(),
            superuser: false,
        }
    }

    pub fn superuser(id: impl Into<UserId>) -> Self {
        Self {
            superuser: true,
            ..Self::user(id)
        }
    }

    pub fn with_group(mut self, group: impl Into<GroupId>) -> Self {
        self.groups.insert(group.into());
        self
    }

    pub fn is_member(&self, group: &GroupId) -> bool {
        self.groups.contains(group)
    }
}

/**
 * Permission evaluation
 * =====================
 * Rules are tried in order and the first match wins:
 *  1. superuser
 *  2. world bit (read and write only)
 *  3. owner
 *  4. group member with the group bit set
 *  5. resource-ACL token for the node
 *  6. a share listing the subject (writable, for write)
 * Delete and rename additionally accept write access on the parent.
 * Checks never fail. ACL and repository errors are logged and
 *  count as a denial.
 */
#[derive(Clone, Copy)]
pub struct Permissions<'a> {
    nodes: &'a dyn Repository<File>,
    acl: &'a dyn ResourceAcl,
}

impl<'a> Permissions<'a> {
    pub fn new(nodes: &'a dyn Repository<File>, acl: &'a dyn ResourceAcl) -> Self {
        Self { nodes, acl }
    }

    pub fn nodes(&self) -> &'a dyn Repository<File> {
        self.nodes
    }

    pub fn can_read(&self, node: &File, subject: &Subject) -> bool {
        self.check(node, subject, Access::Read, AclPermission::Read, true)
    }

    pub fn can_write(&self, node: &File, subject: &Subject) -> bool {
        self.check(node, subject, Access::Write, AclPermission::Write, true)
    }

    pub fn can_delete(&self, node: &File, subject: &Subject) -> bool {
        self.check(node, subject, Access::Write, AclPermission::Delete, false)
            || self.parent_writable(node, subject)
    }

    pub fn can_rename(&self, node: &File, subject: &Subject) -> bool {
        self.can_write(node, subject)
            || self.parent_writable(node, subject)
            || self.acl_grants(node, subject, AclPermission::Rename)
    }

    /// Whether the resource-ACL grants `permission` on this node
    pub fn acl_grants(&self, node: &File, subject: &Subject, permission: AclPermission) -> bool {
        match self.acl.has_resource_permission(
            subject,
            FILE_NAMESPACE,
            node.id().as_str(),
            permission,
        ) {
            Ok(granted) => granted,
            Err(err) => {
                tracing::warn!(node = %node.id(), %permission, "acl lookup failed: {}", err);
                false
            }
        }
    }

    fn check(
        &self,
        node: &File,
        subject: &Subject,
        access: Access,
        permission: AclPermission,
        world: bool,
    ) -> bool {
        if subject.superuser {
            return true;
        }
        if world && node.mode().other(access) {
            return true;
        }
        if node.owner() == &subject.id {
            return true;
        }
        if let Some(group) = node.group() {
            if subject.is_member(group) && node.mode().group(access) {
                return true;
            }
        }
        if self.acl_grants(node, subject, permission) {
            return true;
        }
        node.shares()
            .iter()
            .any(|share| share.grants(&subject.id, access))
    }

    fn parent_writable(&self, node: &File, subject: &Subject) -> bool {
        let Some(parent_id) = node.parent() else {
            return false;
        };
        match self.nodes.find_by_id(parent_id) {
            Ok(Some(parent)) => self.can_write(&parent, subject),
            Ok(None) => {
                tracing::warn!(node = %node.id(), parent = %parent_id, "stale parent reference");
                false
            }
            Err(err) => {
                tracing::warn!(node = %node.id(), parent = %parent_id, "failed to load parent: {}", err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{DenyAllAcl, StaticAcl};
    use crate::drive::{Mode, Share};
    use crate::repository::MemoryRepository;

    fn file(mode: Mode) -> File {
        File::new_file("f", UserId::from("alice"), Some(GroupId::from("staff")), mode)
    }

    #[test]
    fn test_owner_ignores_owner_bits() {
        let nodes = MemoryRepository::<File>::new();
        let perms = Permissions::new(&nodes, &DenyAllAcl);
        let node = file(Mode::default());
        assert!(perms.can_read(&node, &Subject::user("alice")));
        assert!(perms.can_write(&node, &Subject::user("alice")));
        assert!(!perms.can_read(&node, &Subject::user("bob")));
    }

    #[test]
    fn test_superuser_and_world() {
        let nodes = MemoryRepository::<File>::new();
        let perms = Permissions::new(&nodes, &DenyAllAcl);
        let node = file(Mode::OTHER_READ);
        let bob = Subject::user("bob");
        assert!(perms.can_read(&node, &bob));
        assert!(!perms.can_write(&node, &bob));
        assert!(perms.can_write(&node, &Subject::superuser("root")));

        // the world bit alone does not allow deletion
        let open = file(Mode::OTHER_RW);
        assert!(perms.can_write(&open, &bob));
        assert!(!perms.can_delete(&open, &bob));
    }

    #[test]
    fn test_group_bits() {
        let nodes = MemoryRepository::<File>::new();
        let perms = Permissions::new(&nodes, &DenyAllAcl);
        let node = file(Mode::GROUP_READ);
        let member = Subject::user("bob").with_group("staff");
        assert!(perms.can_read(&node, &member));
        assert!(!perms.can_write(&node, &member));
        assert!(!perms.can_read(&node, &Subject::user("bob").with_group("other")));
    }

    #[test]
    fn test_acl_and_shares() {
        let nodes = MemoryRepository::<File>::new();
        let acl = StaticAcl::new();
        let mut node = file(Mode::default());
        let bob = Subject::user("bob");
        acl.grant(&bob.id, FILE_NAMESPACE, node.id().as_str(), AclPermission::Read)
            .unwrap();

        let perms = Permissions::new(&nodes, &acl);
        assert!(perms.can_read(&node, &bob));
        assert!(!perms.can_write(&node, &bob));

        let carol = Subject::user("carol");
        node.add_share(Share::new([carol.id.clone()]));
        assert!(perms.can_read(&node, &carol));
        assert!(!perms.can_write(&node, &carol));
        node.add_share(Share::new([carol.id.clone()]).writable(true));
        assert!(perms.can_write(&node, &carol));
    }

    #[test]
    fn test_parent_write_allows_delete_and_rename() {
        let nodes = MemoryRepository::<File>::new();
        let perms = Permissions::new(&nodes, &DenyAllAcl);
        let parent = File::new_dir("p", UserId::from("bob"), None, Mode::OWNER_RW);
        let mut child = file(Mode::default());
        child.set_parent(Some(parent.id().clone()));
        nodes.save(&parent).unwrap();

        let bob = Subject::user("bob");
        assert!(!perms.can_write(&child, &bob));
        assert!(perms.can_delete(&child, &bob));
        assert!(perms.can_rename(&child, &bob));
        assert!(!perms.can_delete(&child, &Subject::user("carol")));
    }

    #[test]
    fn test_acl_rename_token() {
        let nodes = MemoryRepository::<File>::new();
        let acl = StaticAcl::new();
        let node = file(Mode::default());
        let bob = Subject::user("bob");
        acl.grant(&bob.id, FILE_NAMESPACE, node.id().as_str(), AclPermission::Rename)
            .unwrap();
        let perms = Permissions::new(&nodes, &acl);
        assert!(perms.can_rename(&node, &bob));
        assert!(!perms.can_delete(&node, &bob));
    }
}
