use super::activity::{Activity, Stamp};
use super::error::DriveError;
use super::ids::{Fid, GroupId, UserId};
use super::mode::Mode;
use super::node::File;
use super::permission::Subject;
use super::share::Share;
use super::store::DriveStore;

impl DriveStore {
    /// Change permission bits. The directory flag cannot be changed.
    pub fn set_mode(&self, subject: &Subject, fid: &Fid, mode: Mode) -> Result<File, DriveError> {
        self.coordinate("set_mode", |events| {
            let mut node = self.load_owned(subject, fid)?;
            let mode = if node.is_dir() {
                mode.with_dir()
            } else {
                mode.without_dir()
            };
            if node.mode() != mode {
                node.record(Activity::ModeChanged {
                    stamp: Stamp::now(&subject.id),
                    from: node.mode(),
                    to: mode,
                });
                self.save_recorded(&node, events)?;
            }
            Ok(node)
        })
    }

    pub fn set_group(
        &self,
        subject: &Subject,
        fid: &Fid,
        group: Option<GroupId>,
    ) -> Result<File, DriveError> {
        self.coordinate("set_group", |events| {
            let mut node = self.load_owned(subject, fid)?;
            if node.group() != group.as_ref() {
                node.record(Activity::GroupChanged {
                    stamp: Stamp::now(&subject.id),
                    from: node.group().cloned(),
                    to: group,
                });
                self.save_recorded(&node, events)?;
            }
            Ok(node)
        })
    }

    /// Hand a node to another user. Superuser only.
    pub fn set_owner(&self, subject: &Subject, fid: &Fid, owner: UserId) -> Result<File, DriveError> {
        if !subject.superuser {
            return Err(DriveError::denied(format!(
                "{} cannot change owners",
                subject.id
            )));
        }
        self.coordinate("set_owner", |events| {
            let mut node = self.load(fid)?;
            if node.owner() != &owner {
                node.record(Activity::OwnerChanged {
                    stamp: Stamp::now(&subject.id),
                    from: node.owner().clone(),
                    to: owner,
                });
                self.save_recorded(&node, events)?;
            }
            Ok(node)
        })
    }

    pub fn add_share(&self, subject: &Subject, fid: &Fid, share: Share) -> Result<File, DriveError> {
        self.coordinate("add_share", |_| {
            let mut node = self.load_owned(subject, fid)?;
            tracing::info!(node = %fid, share = %share.id, users = ?share.users, "adding share");
            node.add_share(share);
            self.nodes().save(&node)?;
            Ok(node)
        })
    }

    pub fn remove_share(
        &self,
        subject: &Subject,
        fid: &Fid,
        share_id: &str,
    ) -> Result<File, DriveError> {
        self.coordinate("remove_share", |_| {
            let mut node = self.load_owned(subject, fid)?;
            if !node.remove_share(share_id) {
                return Err(DriveError::not_found(format!("share {} on {}", share_id, fid)));
            }
            self.nodes().save(&node)?;
            Ok(node)
        })
    }

    /// Load a node only its owner or a superuser may administer
    fn load_owned(&self, subject: &Subject, fid: &Fid) -> Result<File, DriveError> {
        let node = self.load(fid)?;
        if !subject.superuser && node.owner() != &subject.id {
            return Err(DriveError::denied(format!(
                "{} does not own {}",
                subject.id, fid
            )));
        }
        Ok(node)
    }
}
