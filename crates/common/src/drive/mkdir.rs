use super::activity::{Activity, Stamp};
use super::error::DriveError;
use super::ids::{Fid, GroupId, UserId};
use super::mode::Mode;
use super::name::validate_filename;
use super::node::File;
use super::permission::Subject;
use super::store::DriveStore;
use super::tree;
use crate::acl::AclPermission;

/// Attributes for newly created nodes. Unset group and mode are
///  inherited from the parent, an unset owner is the acting subject.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub owner: Option<UserId>,
    pub group: Option<GroupId>,
    pub mode: Option<Mode>,
}

impl CreateOptions {
    pub(crate) fn owner_for(&self, subject: &Subject) -> UserId {
        self.owner.clone().unwrap_or_else(|| subject.id.clone())
    }

    pub(crate) fn group_for(&self, parent: &File) -> Option<GroupId> {
        self.group.clone().or_else(|| parent.group().cloned())
    }

    pub(crate) fn mode_for(&self, parent: &File) -> Mode {
        self.mode.unwrap_or_else(|| parent.mode().perm())
    }
}

impl DriveStore {
    /// Get or create the directory `name` below `parent`
    pub fn mkdir(
        &self,
        subject: &Subject,
        parent: &Fid,
        name: &str,
        opts: CreateOptions,
    ) -> Result<File, DriveError> {
        validate_filename(name)?;

        self.coordinate("mkdir", |events| {
            let nodes = self.nodes();
            let perms = self.permissions();
            let mut parent = self.load(parent)?;
            if !parent.is_dir() {
                return Err(DriveError::InvalidArgument(format!(
                    "{} is not a directory",
                    parent.id()
                )));
            }
            if !perms.can_write(&parent, subject)
                && !perms.acl_grants(&parent, subject, AclPermission::MkDir)
            {
                return Err(DriveError::denied(format!(
                    "{} cannot create directories in {}",
                    subject.id,
                    parent.id()
                )));
            }

            if let Some(existing) = tree::find_child_by_name(nodes, &parent, name)? {
                if existing.is_dir() {
                    return Ok(existing);
                }
                return Err(DriveError::AlreadyExists(format!(
                    "{} exists and is not a directory",
                    name
                )));
            }

            let mut dir = File::new_dir(
                name,
                opts.owner_for(subject),
                opts.group_for(&parent),
                opts.mode_for(&parent),
            );
            dir.set_parent(Some(parent.id().clone()));
            dir.record(Activity::Created {
                stamp: Stamp::now(&subject.id),
                name: name.to_string(),
                dir: true,
            });
            self.save_recorded(&dir, events)?;

            parent.record(Activity::Added {
                stamp: Stamp::now(&subject.id),
                child: dir.id().clone(),
                name: name.to_string(),
            });
            tree::apply_standard_entry_order(nodes, &mut parent)?;
            self.save_recorded(&parent, events)?;

            tracing::debug!(dir = %dir.id(), parent = %parent.id(), name, "created directory");
            Ok(dir)
        })
    }
}
