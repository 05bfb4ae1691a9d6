use super::activity::{Activity, Stamp};
use super::error::DriveError;
use super::ids::Fid;
use super::name::validate_filename;
use super::node::File;
use super::permission::Subject;
use super::store::DriveStore;
use super::tree;

impl DriveStore {
    /// Rename a node in place. Renaming to the current name is a no-op.
    pub fn rename(&self, subject: &Subject, fid: &Fid, new_name: &str) -> Result<File, DriveError> {
        validate_filename(new_name)?;

        self.coordinate("rename", |events| {
            let nodes = self.nodes();
            let mut node = self.load(fid)?;
            let Some(parent_id) = node.parent().cloned() else {
                return Err(DriveError::InvalidArgument(format!(
                    "root {} cannot be renamed",
                    fid
                )));
            };
            if !self.permissions().can_rename(&node, subject) {
                return Err(DriveError::denied(format!(
                    "{} cannot rename {}",
                    subject.id, fid
                )));
            }
            if node.filename() == new_name {
                return Ok(node);
            }

            let mut parent = self.load(&parent_id)?;
            if let Some(sibling) = tree::find_child_by_name(nodes, &parent, new_name)? {
                if sibling.id() != node.id() {
                    return Err(DriveError::AlreadyExists(format!(
                        "{} already exists in {}",
                        new_name, parent_id
                    )));
                }
            }

            let from = node.filename().to_string();
            node.record(Activity::Renamed {
                stamp: Stamp::now(&subject.id),
                from: from.clone(),
                to: new_name.to_string(),
            });
            self.save_recorded(&node, events)?;

            let before = parent.entries().to_vec();
            tree::apply_standard_entry_order(nodes, &mut parent)?;
            if parent.entries() != before.as_slice() {
                nodes.save(&parent)?;
            }

            tracing::debug!(node = %fid, from = %from, to = new_name, "renamed");
            Ok(node)
        })
    }
}
