use super::activity::{Activity, Stamp};
use super::error::DriveError;
use super::ids::{Fid, GroupId, UserId};
use super::mode::Mode;
use super::node::File;
use super::permission::Subject;
use super::registry::{NamedRoot, UserRoots};
use super::store::DriveStore;
use crate::acl::{AclPermission, GLOBAL_ROOT_NAMESPACE, PRIVATE_ROOT_NAMESPACE};
use crate::events::DomainEvent;

pub const DEFAULT_ROOT_NAME: &str = "default";

/// Which registry a root is looked up in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootTarget {
    Global { name: String },
    Private { user: UserId, name: String },
}

impl RootTarget {
    pub fn name(&self) -> &str {
        match self {
            RootTarget::Global { name } | RootTarget::Private { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenOptions {
    pub target: RootTarget,
    pub create: bool,
    pub group: Option<GroupId>,
    pub mode: Option<Mode>,
}

impl OpenOptions {
    pub fn global(name: impl Into<String>) -> Self {
        Self::new(RootTarget::Global { name: name.into() })
    }

    /// A user's private root, named [`DEFAULT_ROOT_NAME`] unless changed
    pub fn private(user: impl Into<UserId>) -> Self {
        Self::new(RootTarget::Private {
            user: user.into(),
            name: DEFAULT_ROOT_NAME.to_string(),
        })
    }

    fn new(target: RootTarget) -> Self {
        Self {
            target,
            create: false,
            group: None,
            mode: None,
        }
    }

    pub fn name(mut self, root_name: impl Into<String>) -> Self {
        match &mut self.target {
            RootTarget::Global { name } | RootTarget::Private { name, .. } => {
                *name = root_name.into()
            }
        }
        self
    }

    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn group(mut self, group: impl Into<GroupId>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }
}

impl DriveStore {
    /// Open a root by name, creating it on first use when asked to.
    pub fn open_root(&self, subject: &Subject, opts: OpenOptions) -> Result<File, DriveError> {
        self.coordinate("open_root", |events| {
            self.authorize_open(subject, &opts.target)?;

            let node = match self.registered_root(&opts.target)? {
                Some(mut root) => {
                    if opts.create && subject.superuser {
                        self.overwrite_root_attributes(subject, &mut root, &opts, events)?;
                    }
                    root
                }
                None if !opts.create => {
                    return Err(DriveError::not_found(format!("root {:?}", opts.target)));
                }
                None => self.create_root(subject, &opts, events)?,
            };

            if !self.permissions().can_read(&node, subject) {
                return Err(DriveError::denied(format!(
                    "{} cannot read root {}",
                    subject.id,
                    node.id()
                )));
            }
            Ok(node)
        })
    }

    fn authorize_open(&self, subject: &Subject, target: &RootTarget) -> Result<(), DriveError> {
        if subject.superuser {
            return Ok(());
        }
        let acl = &self.inner().acl;
        match target {
            RootTarget::Private { user, .. } if *user == subject.id => Ok(()),
            RootTarget::Private { user, .. } => Ok(acl.audit_resource_permission(
                subject,
                PRIVATE_ROOT_NAMESPACE,
                user.as_str(),
                AclPermission::Open,
            )?),
            RootTarget::Global { name } => Ok(acl.audit_resource_permission(
                subject,
                GLOBAL_ROOT_NAMESPACE,
                name,
                AclPermission::Open,
            )?),
        }
    }

    /// The root a registry entry points at. A dangling entry counts
    ///  as missing.
    fn registered_root(&self, target: &RootTarget) -> Result<Option<File>, DriveError> {
        let inner = self.inner();
        let fid: Option<Fid> = match target {
            RootTarget::Global { name } => inner.named_roots.find_by_id(name)?.map(|e| e.root),
            RootTarget::Private { user, name } => inner
                .user_roots
                .find_by_id(user)?
                .and_then(|mut entry| entry.roots.remove(name)),
        };
        let Some(fid) = fid else {
            return Ok(None);
        };
        let root = inner.nodes.find_by_id(&fid)?;
        if root.is_none() {
            tracing::warn!(root = %fid, "registry entry points at a missing root");
        }
        Ok(root)
    }

    fn create_root(
        &self,
        subject: &Subject,
        opts: &OpenOptions,
        events: &mut Vec<DomainEvent>,
    ) -> Result<File, DriveError> {
        let inner = self.inner();
        let owner = match &opts.target {
            RootTarget::Private { user, .. } => user.clone(),
            RootTarget::Global { .. } => subject.id.clone(),
        };
        let name = opts.target.name();
        let mode = opts.mode.unwrap_or(Mode::OWNER_RW);
        let mut root = File::new_dir(name, owner, opts.group.clone(), mode);
        root.record(Activity::Created {
            stamp: Stamp::now(&subject.id),
            name: name.to_string(),
            dir: true,
        });
        self.save_recorded(&root, events)?;

        match &opts.target {
            RootTarget::Global { name } => inner.named_roots.save(&NamedRoot {
                name: name.clone(),
                root: root.id().clone(),
            })?,
            RootTarget::Private { user, name } => {
                let mut entry = inner
                    .user_roots
                    .find_by_id(user)?
                    .unwrap_or_else(|| UserRoots::new(user.clone()));
                entry.roots.insert(name.clone(), root.id().clone());
                inner.user_roots.save(&entry)?;
            }
        }

        tracing::info!(root = %root.id(), target = ?opts.target, "created root");
        Ok(root)
    }

    fn overwrite_root_attributes(
        &self,
        subject: &Subject,
        root: &mut File,
        opts: &OpenOptions,
        events: &mut Vec<DomainEvent>,
    ) -> Result<(), DriveError> {
        if let Some(group) = &opts.group {
            if root.group() != Some(group) {
                tracing::info!(root = %root.id(), from = ?root.group(), to = %group, "overwriting root group");
                root.record(Activity::GroupChanged {
                    stamp: Stamp::now(&subject.id),
                    from: root.group().cloned(),
                    to: Some(group.clone()),
                });
                self.save_recorded(root, events)?;
            }
        }
        if let Some(mode) = opts.mode {
            let mode = mode.with_dir();
            if root.mode() != mode {
                tracing::info!(root = %root.id(), from = %root.mode(), to = %mode, "overwriting root mode");
                root.record(Activity::ModeChanged {
                    stamp: Stamp::now(&subject.id),
                    from: root.mode(),
                    to: mode,
                });
                self.save_recorded(root, events)?;
            }
        }
        Ok(())
    }
}
