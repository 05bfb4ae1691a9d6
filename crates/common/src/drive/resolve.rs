use super::error::DriveError;
use super::ids::Fid;
use super::permission::Subject;
use super::registry::{Drive, Namespace};
use super::store::DriveStore;
use super::tree::MAX_PARENT_HOPS;

impl DriveStore {
    /// Find which registered root a node lives under.
    ///
    /// Returns `Ok(None)` when the parent chain ends at a root no
    /// registry knows about, or at a dangling parent reference.
    pub fn find_drive(&self, subject: &Subject, fid: &Fid) -> Result<Option<Drive>, DriveError> {
        let inner = self.inner();
        let mut node = self.load(fid)?;
        let mut hops = 0;
        while let Some(parent_id) = node.parent().cloned() {
            hops += 1;
            if hops > MAX_PARENT_HOPS {
                tracing::error!(node = %fid, "parent chain exceeds {} hops", MAX_PARENT_HOPS);
                return Err(DriveError::CycleDetected(fid.clone()));
            }
            match inner.nodes.find_by_id(&parent_id)? {
                Some(parent) => node = parent,
                None => {
                    tracing::warn!(node = %node.id(), parent = %parent_id, "stale parent reference");
                    return Ok(None);
                }
            }
        }

        if !self.permissions().can_read(&node, subject) {
            return Err(DriveError::denied(format!(
                "{} cannot read root {}",
                subject.id,
                node.id()
            )));
        }
        let root = node.id();

        for entry in inner.named_roots.all() {
            let entry = entry?;
            if &entry.root == root {
                return Ok(Some(Drive {
                    namespace: Namespace::Global,
                    name: entry.name,
                    root: entry.root,
                }));
            }
        }

        for entry in inner.user_roots.all() {
            let entry = entry?;
            if let Some((name, _)) = entry.roots.iter().find(|(_, id)| *id == root) {
                return Ok(Some(Drive {
                    namespace: Namespace::Private {
                        user: entry.user.clone(),
                    },
                    name: name.clone(),
                    root: root.clone(),
                }));
            }
        }

        tracing::debug!(root = %root, "root is not registered");
        Ok(None)
    }

    /// Every drive the subject can read: global roots first, then the
    ///  subject's private roots (everyone's, for a superuser)
    pub fn read_drives(&self, subject: &Subject) -> Result<Vec<Drive>, DriveError> {
        let inner = self.inner();
        let mut candidates = Vec::new();

        for entry in inner.named_roots.all() {
            let entry = entry?;
            candidates.push(Drive {
                namespace: Namespace::Global,
                name: entry.name,
                root: entry.root,
            });
        }

        let private = if subject.superuser {
            inner.user_roots.all().collect::<Result<Vec<_>, _>>()?
        } else {
            inner
                .user_roots
                .find_by_id(&subject.id)?
                .into_iter()
                .collect()
        };
        for entry in private {
            for (name, root) in entry.roots {
                candidates.push(Drive {
                    namespace: Namespace::Private {
                        user: entry.user.clone(),
                    },
                    name,
                    root,
                });
            }
        }

        let perms = self.permissions();
        let mut drives = Vec::with_capacity(candidates.len());
        for drive in candidates {
            match inner.nodes.find_by_id(&drive.root)? {
                Some(root) if perms.can_read(&root, subject) => drives.push(drive),
                Some(_) => {}
                None => tracing::warn!(drive = %drive, "registry points at a missing root"),
            }
        }
        Ok(drives)
    }
}
