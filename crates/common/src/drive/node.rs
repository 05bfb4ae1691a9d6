use serde::{Deserialize, Serialize};

use super::activity::{Activity, Stamp};
use super::content::{ContentInfo, VersionSource};
use super::ids::{BlobKey, Fid, GroupId, UserId};
use super::mode::Mode;
use super::share::Share;
use crate::repository::Entity;

/**
 * Files
 * =====
 * A file is a single addressable node in a drive tree, either a
 *  directory holding an ordered list of child ids, or a leaf
 *  holding versioned content in the blob store.
 * Every mutation of the snapshot fields (name, owner, group,
 *  mode, content, entries) goes through [`File::record`], which
 *  appends to the audit log and applies the change in one step,
 *  so the snapshot always agrees with the history.
 * Files are plain data. Anything that needs other nodes (paths,
 *  child lookup, permission checks) takes the repository as
 *  an argument instead.
 */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    id: Fid,
    filename: String,
    #[serde(default)]
    entries: Vec<Fid>,
    owner: UserId,
    #[serde(default)]
    group: Option<GroupId>,
    mode: Mode,
    #[serde(default)]
    content: Option<ContentInfo>,
    // None only for roots
    #[serde(default)]
    parent: Option<Fid>,
    #[serde(default)]
    shares: Vec<Share>,
    #[serde(default)]
    audit_log: Vec<Activity>,
}

/// A historical content version of a file
#[derive(Debug, Clone, Copy)]
pub struct Version<'a> {
    pub stamp: &'a Stamp,
    pub content: &'a ContentInfo,
    pub source: VersionSource,
}

impl File {
    pub fn new_dir(
        filename: impl Into<String>,
        owner: UserId,
        group: Option<GroupId>,
        mode: Mode,
    ) -> Self {
        Self::new(filename.into(), owner, group, mode.with_dir())
    }

    pub fn new_file(
        filename: impl Into<String>,
        owner: UserId,
        group: Option<GroupId>,
        mode: Mode,
    ) -> Self {
        Self::new(filename.into(), owner, group, mode.without_dir())
    }

    fn new(filename: String, owner: UserId, group: Option<GroupId>, mode: Mode) -> Self {
        Self {
            id: Fid::generate(),
            filename,
            entries: Vec::new(),
            owner,
            group,
            mode,
            content: None,
            parent: None,
            shares: Vec::new(),
            audit_log: Vec::new(),
        }
    }

    pub fn id(&self) -> &Fid {
        &self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn entries(&self) -> &[Fid] {
        &self.entries
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn group(&self) -> Option<&GroupId> {
        self.group.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The latest content version, if any was ever stored
    pub fn content(&self) -> Option<&ContentInfo> {
        self.content.as_ref()
    }

    pub fn parent(&self) -> Option<&Fid> {
        self.parent.as_ref()
    }

    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    pub fn audit_log(&self) -> &[Activity] {
        &self.audit_log
    }

    pub fn latest_activity(&self) -> Option<&Activity> {
        self.audit_log.last()
    }

    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Point this node at a new parent without touching either
    ///  node's history. Nothing checks the result forms a tree.
    pub fn set_parent(&mut self, parent: Option<Fid>) {
        self.parent = parent;
    }

    pub(crate) fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    pub(crate) fn set_entries(&mut self, entries: Vec<Fid>) {
        self.entries = entries;
    }

    pub(crate) fn add_share(&mut self, share: Share) {
        self.shares.push(share);
    }

    /// Remove a share by id, returning whether one was removed
    pub(crate) fn remove_share(&mut self, share_id: &str) -> bool {
        let before = self.shares.len();
        self.shares.retain(|share| share.id != share_id);
        before != self.shares.len()
    }

    /// Append to the audit log and apply the activity to the snapshot
    pub fn record(&mut self, activity: Activity) {
        match &activity {
            Activity::Renamed { to, .. } => self.filename = to.clone(),
            Activity::VersionAdded { content, .. } => self.content = Some(content.clone()),
            Activity::GroupChanged { to, .. } => self.group = to.clone(),
            Activity::OwnerChanged { to, .. } => self.owner = to.clone(),
            Activity::ModeChanged { to, .. } => self.mode = *to,
            Activity::Added { child, .. } => {
                if !self.entries.contains(child) {
                    self.entries.push(child.clone());
                }
            }
            Activity::Deleted { child, .. } => self.entries.retain(|entry| entry != child),
            Activity::Created { .. } | Activity::Moved { .. } => {}
        }
        self.audit_log.push(activity);
    }

    /// Every stored content version, oldest first
    pub fn versions(&self) -> impl Iterator<Item = Version<'_>> + '_ {
        self.audit_log.iter().filter_map(|activity| match activity {
            Activity::VersionAdded {
                stamp,
                content,
                source,
            } => Some(Version {
                stamp,
                content,
                source: *source,
            }),
            _ => None,
        })
    }

    /// Blob keys of all versions this node references
    pub fn blob_keys(&self) -> Vec<BlobKey> {
        let mut keys: Vec<BlobKey> = Vec::new();
        let current = self.content.iter();
        for content in self.versions().map(|v| v.content).chain(current) {
            if !keys.contains(&content.key) {
                keys.push(content.key.clone());
            }
        }
        keys
    }
}

impl Entity for File {
    type Id = Fid;

    fn id(&self) -> &Fid {
        &self.id
    }
}
