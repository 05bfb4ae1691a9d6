use super::activity::{Activity, Stamp};
use super::error::{DriveError, ErrorKind};
use super::ids::Fid;
use super::node::File;
use super::permission::Subject;
use super::store::DriveStore;
use crate::events::DomainEvent;

#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOptions {
    /// Also delete everything below a non-empty directory
    pub recursive: bool,
}

impl DeleteOptions {
    pub fn recursive() -> Self {
        Self { recursive: true }
    }
}

impl DriveStore {
    /// Remove a node, its subtree when recursive, and every content
    ///  version they reference. Deleting a missing node succeeds.
    ///
    /// The node is detached from its parent before the subtree is
    ///  collected. If collecting fails the node stays detached.
    pub fn delete(&self, subject: &Subject, fid: &Fid, opts: DeleteOptions) -> Result<(), DriveError> {
        self.coordinate("delete", |events| {
            let inner = self.inner();
            let perms = self.permissions();
            let Some(node) = inner.nodes.find_by_id(fid)? else {
                tracing::debug!(node = %fid, "nothing to delete");
                return Ok(());
            };

            if node.is_dir() && !node.entries().is_empty() && !opts.recursive {
                return Err(DriveError::InvalidArgument(format!(
                    "directory {} is not empty",
                    fid
                )));
            }
            if !perms.can_delete(&node, subject) {
                return Err(DriveError::denied(format!(
                    "{} cannot delete {}",
                    subject.id, fid
                )));
            }

            if let Some(parent_id) = node.parent() {
                match inner.nodes.find_by_id(parent_id)? {
                    Some(mut parent) => {
                        parent.record(Activity::Deleted {
                            stamp: Stamp::now(&subject.id),
                            child: fid.clone(),
                            name: node.filename().to_string(),
                        });
                        self.save_recorded(&parent, events)?;
                    }
                    None => {
                        tracing::warn!(node = %fid, parent = %parent_id, "stale parent reference")
                    }
                }
            }

            let doomed = self.collect_subtree(subject, fid)?;
            for node in doomed {
                for key in node.blob_keys() {
                    inner.blobs.delete(&key)?;
                }
                inner.nodes.delete_by_id(node.id())?;
                events.push(DomainEvent {
                    node: node.id().clone(),
                    activity: Activity::Deleted {
                        stamp: Stamp::now(&subject.id),
                        child: node.id().clone(),
                        name: node.filename().to_string(),
                    },
                });
            }
            Ok(())
        })
    }

    /// Every node of the subtree in pre-order. Fails if any of them
    ///  may not be deleted by `subject`.
    fn collect_subtree(&self, subject: &Subject, fid: &Fid) -> Result<Vec<File>, DriveError> {
        let perms = self.permissions();
        let mut doomed = Vec::new();
        self.walk_dir(subject, fid, |id, node| match node {
            Ok(node) => {
                if !perms.can_delete(node, subject) {
                    return Err(DriveError::denied(format!(
                        "{} cannot delete {}",
                        subject.id, id
                    )));
                }
                doomed.push(node.clone());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::warn!(node = %id, "skipping stale entry");
                Ok(())
            }
            Err(err) => Err(err),
        })?;
        Ok(doomed)
    }
}
