use std::cmp::Ordering;

use super::error::DriveError;
use super::ids::Fid;
use super::node::File;
use crate::repository::Repository;

/// Upper bound on parent hops before a chain is considered cyclic
pub const MAX_PARENT_HOPS: usize = 1000;

/// Load a directory's children in entry order, skipping stale ids
pub fn load_children(nodes: &dyn Repository<File>, dir: &File) -> Result<Vec<File>, DriveError> {
    let mut children = Vec::with_capacity(dir.entries().len());
    for id in dir.entries() {
        match nodes.find_by_id(id)? {
            Some(child) => children.push(child),
            None => tracing::warn!(parent = %dir.id(), child = %id, "skipping stale entry"),
        }
    }
    Ok(children)
}

pub fn find_child_by_name(
    nodes: &dyn Repository<File>,
    dir: &File,
    name: &str,
) -> Result<Option<File>, DriveError> {
    for id in dir.entries() {
        match nodes.find_by_id(id)? {
            Some(child) if child.filename() == name => return Ok(Some(child)),
            Some(_) => {}
            None => tracing::warn!(parent = %dir.id(), child = %id, "skipping stale entry"),
        }
    }
    Ok(None)
}

/// Directories first, then case-insensitive name, then exact name
pub fn standard_entry_order(a: &File, b: &File) -> Ordering {
    b.is_dir()
        .cmp(&a.is_dir())
        .then_with(|| {
            a.filename()
                .to_lowercase()
                .cmp(&b.filename().to_lowercase())
        })
        .then_with(|| a.filename().cmp(b.filename()))
}

/// Re-sort a directory's entries in place. Stale ids keep their
///  relative order at the end.
pub fn apply_standard_entry_order(
    nodes: &dyn Repository<File>,
    dir: &mut File,
) -> Result<(), DriveError> {
    let mut live = Vec::with_capacity(dir.entries().len());
    let mut stale = Vec::new();
    for id in dir.entries() {
        match nodes.find_by_id(id)? {
            Some(child) => live.push(child),
            None => stale.push(id.clone()),
        }
    }
    live.sort_by(standard_entry_order);

    let mut entries: Vec<Fid> = live.iter().map(|child| child.id().clone()).collect();
    entries.extend(stale);
    dir.set_entries(entries);
    Ok(())
}

/// Reconstruct `/`-joined path of a node from its root
pub fn path_of(nodes: &dyn Repository<File>, node: &File) -> Result<String, DriveError> {
    let mut names = vec![node.filename().to_string()];
    let mut current = node.parent().cloned();
    let mut hops = 0;
    while let Some(id) = current {
        hops += 1;
        if hops > MAX_PARENT_HOPS {
            return Err(DriveError::CycleDetected(node.id().clone()));
        }
        let Some(parent) = nodes.find_by_id(&id)? else {
            tracing::warn!(node = %node.id(), parent = %id, "stale parent reference");
            break;
        };
        current = parent.parent().cloned();
        // the root's own name is the drive name, not part of the path
        if current.is_some() {
            names.push(parent.filename().to_string());
        }
    }
    if node.is_root() {
        return Ok("/".to_string());
    }
    names.reverse();
    Ok(format!("/{}", names.join("/")))
}
