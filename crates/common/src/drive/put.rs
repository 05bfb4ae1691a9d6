use std::io::Read;

use super::activity::{Activity, Stamp};
use super::content::{ContentInfo, HashingReader, VersionSource, HASH_ALGORITHM};
use super::error::DriveError;
use super::ids::{BlobKey, Fid, GroupId, UserId};
use super::maybe_mime::MaybeMime;
use super::mkdir::CreateOptions;
use super::mode::Mode;
use super::name::validate_filename;
use super::node::File;
use super::permission::Subject;
use super::sniff::sniff_blob;
use super::store::DriveStore;
use super::tree;

#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub owner: Option<UserId>,
    pub group: Option<GroupId>,
    pub mode: Option<Mode>,
    pub source: VersionSource,
    /// Name the content had where it came from
    pub original_filename: Option<String>,
}

impl PutOptions {
    fn create_options(&self) -> CreateOptions {
        CreateOptions {
            owner: self.owner.clone(),
            group: self.group.clone(),
            mode: self.mode,
        }
    }
}

impl DriveStore {
    /// Store a new content version of `name` below `parent`, creating
    ///  the file if it does not exist yet.
    ///
    /// An empty `name` falls back to the original filename, then to
    ///  the generated blob key.
    pub fn put(
        &self,
        subject: &Subject,
        parent: &Fid,
        name: &str,
        content: &mut dyn Read,
        opts: PutOptions,
    ) -> Result<File, DriveError> {
        let key = BlobKey::generate();
        let filename = match (name, &opts.original_filename) {
            ("", Some(original)) => original.clone(),
            ("", None) => key.to_string(),
            (name, _) => name.to_string(),
        };
        validate_filename(&filename)?;

        self.coordinate("put", |events| {
            let inner = self.inner();
            let nodes = self.nodes();
            let mut parent = self.load(parent)?;
            if !parent.is_dir() {
                return Err(DriveError::InvalidArgument(format!(
                    "{} is not a directory",
                    parent.id()
                )));
            }
            if !self.permissions().can_write(&parent, subject) {
                return Err(DriveError::denied(format!(
                    "{} cannot write to {}",
                    subject.id,
                    parent.id()
                )));
            }

            let (mut node, created) = match tree::find_child_by_name(nodes, &parent, &filename)? {
                Some(existing) if existing.is_dir() => {
                    return Err(DriveError::AlreadyExists(format!(
                        "{} exists and is a directory",
                        filename
                    )));
                }
                Some(existing) => (existing, false),
                None => {
                    let create = opts.create_options();
                    let mut node = File::new_file(
                        filename.as_str(),
                        create.owner_for(subject),
                        create.group_for(&parent),
                        create.mode_for(&parent),
                    );
                    node.set_parent(Some(parent.id().clone()));
                    (node, true)
                }
            };

            if inner.blobs.exists(&key)? {
                return Err(DriveError::AlreadyExists(format!("blob {}", key)));
            }
            let mut hashing = HashingReader::new(content);
            let written = inner.blobs.write(&key, &mut hashing)?;
            let size = hashing.count();
            if written != size {
                tracing::warn!(key = %key, written, size, "blob store reported a different size");
            }
            let hash = hashing.finish();
            let mime = sniff_blob(inner.blobs.as_ref(), &key, &filename)?;

            let info = ContentInfo {
                original_filename: opts
                    .original_filename
                    .clone()
                    .unwrap_or_else(|| filename.clone()),
                key: key.clone(),
                hash,
                hash_algorithm: HASH_ALGORITHM.to_string(),
                size,
                mime: MaybeMime::from(mime),
            };
            node.record(Activity::VersionAdded {
                stamp: Stamp::now(&subject.id),
                content: info,
                source: opts.source,
            });
            self.save_recorded(&node, events)?;

            if created {
                parent.record(Activity::Added {
                    stamp: Stamp::now(&subject.id),
                    child: node.id().clone(),
                    name: filename.clone(),
                });
                tree::apply_standard_entry_order(nodes, &mut parent)?;
                self.save_recorded(&parent, events)?;
            }

            tracing::debug!(
                node = %node.id(),
                key = %key,
                size,
                created,
                "stored content version"
            );
            Ok(node)
        })
    }
}
