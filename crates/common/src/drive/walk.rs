use std::collections::HashSet;

use super::error::DriveError;
use super::ids::Fid;
use super::node::File;
use super::permission::{Permissions, Subject};

/// Pre-order, depth-first walk starting at `start`.
///
/// The visitor sees every node exactly once, either as a loaded and
/// readable node or as the error that prevented it (missing node,
/// repository failure, no read permission). Children are only walked
/// for readable directories. The first error returned by the visitor
/// aborts the walk and is handed back to the caller.
pub fn walk_dir<F>(
    perms: &Permissions<'_>,
    subject: &Subject,
    start: &Fid,
    mut visitor: F,
) -> Result<(), DriveError>
where
    F: FnMut(&Fid, Result<&File, DriveError>) -> Result<(), DriveError>,
{
    let nodes = perms.nodes();
    let mut stack = vec![start.clone()];
    let mut seen = HashSet::new();

    while let Some(id) = stack.pop() {
        if !seen.insert(id.clone()) {
            tracing::warn!(node = %id, "node reachable twice, skipping");
            continue;
        }

        let node = match nodes.find_by_id(&id) {
            Ok(Some(node)) => node,
            Ok(None) => {
                visitor(&id, Err(DriveError::not_found(format!("node {}", id))))?;
                continue;
            }
            Err(err) => {
                visitor(&id, Err(err.into()))?;
                continue;
            }
        };

        if !perms.can_read(&node, subject) {
            visitor(
                &id,
                Err(DriveError::denied(format!("{} cannot read {}", subject.id, id))),
            )?;
            continue;
        }

        visitor(&id, Ok(&node))?;

        if node.is_dir() {
            stack.extend(node.entries().iter().rev().cloned());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::DenyAllAcl;
    use crate::drive::{ErrorKind, Mode, UserId};
    use crate::repository::{MemoryRepository, Repository};

    fn tree() -> (MemoryRepository<File>, File) {
        let nodes = MemoryRepository::<File>::new();
        let alice = UserId::from("alice");
        let mut root = File::new_dir("root", alice.clone(), None, Mode::OWNER_RW);
        let mut docs = File::new_dir("docs", alice.clone(), None, Mode::OWNER_RW);
        let mut a = File::new_file("a", alice.clone(), None, Mode::OWNER_RW);
        let mut b = File::new_file("b", alice, None, Mode::OWNER_RW);
        docs.set_parent(Some(root.id().clone()));
        a.set_parent(Some(docs.id().clone()));
        b.set_parent(Some(root.id().clone()));
        docs.set_entries(vec![a.id().clone()]);
        root.set_entries(vec![docs.id().clone(), b.id().clone()]);
        for node in [&root, &docs, &a, &b] {
            nodes.save(node).unwrap();
        }
        (nodes, root)
    }

    #[test]
    fn test_pre_order() {
        let (nodes, root) = tree();
        let perms = Permissions::new(&nodes, &DenyAllAcl);
        let mut names = Vec::new();
        walk_dir(&perms, &Subject::user("alice"), root.id(), |_, node| {
            names.push(node?.filename().to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(names, vec!["root", "docs", "a", "b"]);
    }

    #[test]
    fn test_visitor_error_aborts() {
        let (nodes, root) = tree();
        let perms = Permissions::new(&nodes, &DenyAllAcl);
        let mut visited = 0;
        let result = walk_dir(&perms, &Subject::user("alice"), root.id(), |_, node| {
            visited += 1;
            if node?.filename() == "docs" {
                return Err(DriveError::InvalidArgument("stop".to_string()));
            }
            Ok(())
        });
        assert!(matches!(result, Err(DriveError::InvalidArgument(_))));
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_missing_start_reaches_visitor() {
        let (nodes, _) = tree();
        let perms = Permissions::new(&nodes, &DenyAllAcl);
        let mut kinds = Vec::new();
        walk_dir(&perms, &Subject::user("alice"), &Fid::from("nope"), |_, node| {
            kinds.push(node.map(|_| ()).map_err(|e| e.kind()));
            Ok(())
        })
        .unwrap();
        assert_eq!(kinds, vec![Err(ErrorKind::NotFound)]);
    }

    #[test]
    fn test_unreadable_root_is_not_descended() {
        let (nodes, root) = tree();
        let perms = Permissions::new(&nodes, &DenyAllAcl);
        let mut calls = 0;
        walk_dir(&perms, &Subject::user("bob"), root.id(), |_, node| {
            calls += 1;
            assert!(node.is_err());
            Ok(())
        })
        .unwrap();
        assert_eq!(calls, 1);
    }
}
