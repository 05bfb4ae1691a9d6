use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::content::Content;
use super::error::{DriveError, ErrorKind};
use super::ids::Fid;
use super::node::File;
use super::permission::{Permissions, Subject};
use super::registry::{NamedRoot, UserRoots};
use super::tree;
use super::walk;
use crate::acl::{DenyAllAcl, ResourceAcl};
use crate::blobs::{BlobStore, MemoryBlobStore};
use crate::events::{DomainEvent, EventPublisher, TracingPublisher};
use crate::repository::{MemoryRepository, Repository};

/**
 * Drive store
 * ===========
 * The entry point for every drive operation. Holds the injected
 *  collaborators (node repository, root registries, blob store,
 *  resource-ACL, event sink) and the single lock that serializes
 *  structural mutations.
 * Reads never take the lock and may observe a mutation half way,
 *  e.g. a child saved before its parent's entry list.
 * Mutations publish their events only after the lock is released.
 */
#[derive(Clone)]
pub struct DriveStore(Arc<DriveStoreInner>);

pub(crate) struct DriveStoreInner {
    pub nodes: Arc<dyn Repository<File>>,
    pub named_roots: Arc<dyn Repository<NamedRoot>>,
    pub user_roots: Arc<dyn Repository<UserRoots>>,
    pub blobs: Arc<dyn BlobStore>,
    pub acl: Arc<dyn ResourceAcl>,
    pub events: Arc<dyn EventPublisher>,
    lock: Mutex<()>,
}

impl fmt::Debug for DriveStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveStore")
            .field("nodes", &self.0.nodes)
            .field("blobs", &self.0.blobs)
            .field("acl", &self.0.acl)
            .finish()
    }
}

/// Builds a [`DriveStore`], defaulting every collaborator to an
///  in-memory implementation, a deny-all ACL and a tracing event sink
#[derive(Default)]
pub struct DriveStoreBuilder {
    nodes: Option<Arc<dyn Repository<File>>>,
    named_roots: Option<Arc<dyn Repository<NamedRoot>>>,
    user_roots: Option<Arc<dyn Repository<UserRoots>>>,
    blobs: Option<Arc<dyn BlobStore>>,
    acl: Option<Arc<dyn ResourceAcl>>,
    events: Option<Arc<dyn EventPublisher>>,
}

impl DriveStoreBuilder {
    pub fn nodes(mut self, nodes: Arc<dyn Repository<File>>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    pub fn named_roots(mut self, named_roots: Arc<dyn Repository<NamedRoot>>) -> Self {
        self.named_roots = Some(named_roots);
        self
    }

    pub fn user_roots(mut self, user_roots: Arc<dyn Repository<UserRoots>>) -> Self {
        self.user_roots = Some(user_roots);
        self
    }

    pub fn blobs(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn acl(mut self, acl: Arc<dyn ResourceAcl>) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> DriveStore {
        DriveStore(Arc::new(DriveStoreInner {
            nodes: self
                .nodes
                .unwrap_or_else(|| Arc::new(MemoryRepository::<File>::new())),
            named_roots: self
                .named_roots
                .unwrap_or_else(|| Arc::new(MemoryRepository::<NamedRoot>::new())),
            user_roots: self
                .user_roots
                .unwrap_or_else(|| Arc::new(MemoryRepository::<UserRoots>::new())),
            blobs: self
                .blobs
                .unwrap_or_else(|| Arc::new(MemoryBlobStore::new())),
            acl: self.acl.unwrap_or_else(|| Arc::new(DenyAllAcl)),
            events: self.events.unwrap_or_else(|| Arc::new(TracingPublisher)),
            lock: Mutex::new(()),
        }))
    }
}

impl DriveStore {
    pub fn builder() -> DriveStoreBuilder {
        DriveStoreBuilder::default()
    }

    /// A store backed entirely by memory
    pub fn in_memory() -> Self {
        Self::builder().build()
    }

    pub(crate) fn inner(&self) -> &DriveStoreInner {
        &self.0
    }

    pub fn nodes(&self) -> &dyn Repository<File> {
        self.0.nodes.as_ref()
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.0.blobs
    }

    pub fn permissions(&self) -> Permissions<'_> {
        Permissions::new(self.0.nodes.as_ref(), self.0.acl.as_ref())
    }

    /// Run a structural mutation under the store lock, then publish
    ///  whatever events it collected, even if it failed part way
    pub(crate) fn coordinate<T>(
        &self,
        operation: &'static str,
        op: impl FnOnce(&mut Vec<DomainEvent>) -> Result<T, DriveError>,
    ) -> Result<T, DriveError> {
        let mut events = Vec::new();
        let result = {
            let _guard = self.0.lock.lock();
            op(&mut events)
        };
        if let Err(err) = &result {
            if err.kind() == ErrorKind::Infrastructure {
                tracing::error!(operation, error = %err, "drive mutation failed");
            } else {
                tracing::debug!(operation, error = %err, "drive mutation rejected");
            }
        }
        for event in events {
            self.0.events.publish(event);
        }
        result
    }

    pub(crate) fn load(&self, fid: &Fid) -> Result<File, DriveError> {
        self.0
            .nodes
            .find_by_id(fid)?
            .ok_or_else(|| DriveError::not_found(format!("node {}", fid)))
    }

    /// Persist a node and queue its latest audit entry as an event
    pub(crate) fn save_recorded(
        &self,
        node: &File,
        events: &mut Vec<DomainEvent>,
    ) -> Result<(), DriveError> {
        self.0.nodes.save(node)?;
        if let Some(activity) = node.latest_activity() {
            events.push(DomainEvent {
                node: node.id().clone(),
                activity: activity.clone(),
            });
        }
        Ok(())
    }

    /// Load a node the subject may read
    pub fn stat(&self, subject: &Subject, fid: &Fid) -> Result<File, DriveError> {
        let node = self.load(fid)?;
        if !self.permissions().can_read(&node, subject) {
            return Err(DriveError::denied(format!(
                "{} cannot read {}",
                subject.id, fid
            )));
        }
        Ok(node)
    }

    /// The latest content version of a file
    pub fn get(&self, subject: &Subject, fid: &Fid) -> Result<Content, DriveError> {
        let node = self.stat(subject, fid)?;
        if node.is_dir() {
            return Err(DriveError::InvalidArgument(format!(
                "{} is a directory",
                fid
            )));
        }
        let info = node
            .content()
            .cloned()
            .ok_or_else(|| DriveError::not_found(format!("content of {}", fid)))?;
        Ok(Content::new(node.filename(), info, self.0.blobs.clone()))
    }

    /// Every content version of a file, oldest first
    pub fn versions(&self, subject: &Subject, fid: &Fid) -> Result<Vec<Content>, DriveError> {
        let node = self.stat(subject, fid)?;
        Ok(node
            .versions()
            .map(|version| {
                Content::new(
                    node.filename(),
                    version.content.clone(),
                    self.0.blobs.clone(),
                )
            })
            .collect())
    }

    /// One historical version by position, zero being the oldest
    pub fn get_version(
        &self,
        subject: &Subject,
        fid: &Fid,
        index: usize,
    ) -> Result<Content, DriveError> {
        self.versions(subject, fid)?
            .into_iter()
            .nth(index)
            .ok_or_else(|| DriveError::not_found(format!("version {} of {}", index, fid)))
    }

    /// Readable children of a directory in entry order
    pub fn read_dir(&self, subject: &Subject, fid: &Fid) -> Result<Vec<File>, DriveError> {
        let dir = self.stat(subject, fid)?;
        if !dir.is_dir() {
            return Err(DriveError::InvalidArgument(format!(
                "{} is not a directory",
                fid
            )));
        }
        let perms = self.permissions();
        let children = tree::load_children(self.nodes(), &dir)?;
        Ok(children
            .into_iter()
            .filter(|child| {
                let readable = perms.can_read(child, subject);
                if !readable {
                    tracing::debug!(dir = %fid, child = %child.id(), "hiding unreadable entry");
                }
                readable
            })
            .collect())
    }

    pub fn child_by_name(
        &self,
        subject: &Subject,
        dir: &Fid,
        name: &str,
    ) -> Result<Option<File>, DriveError> {
        let dir = self.stat(subject, dir)?;
        let child = tree::find_child_by_name(self.nodes(), &dir, name)?;
        Ok(child.filter(|child| self.permissions().can_read(child, subject)))
    }

    /// `/`-joined path of a node below its root
    pub fn path(&self, subject: &Subject, fid: &Fid) -> Result<String, DriveError> {
        let node = self.stat(subject, fid)?;
        tree::path_of(self.nodes(), &node)
    }

    /// See [`walk::walk_dir`]
    pub fn walk_dir<F>(&self, subject: &Subject, start: &Fid, visitor: F) -> Result<(), DriveError>
    where
        F: FnMut(&Fid, Result<&File, DriveError>) -> Result<(), DriveError>,
    {
        walk::walk_dir(&self.permissions(), subject, start, visitor)
    }

    pub fn can_read(&self, node: &File, subject: &Subject) -> bool {
        self.permissions().can_read(node, subject)
    }

    pub fn can_write(&self, node: &File, subject: &Subject) -> bool {
        self.permissions().can_write(node, subject)
    }

    pub fn can_delete(&self, node: &File, subject: &Subject) -> bool {
        self.permissions().can_delete(node, subject)
    }

    pub fn can_rename(&self, node: &File, subject: &Subject) -> bool {
        self.permissions().can_rename(node, subject)
    }
}
