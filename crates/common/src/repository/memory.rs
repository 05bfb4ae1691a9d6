use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use super::provider::{Entity, Repository, RepositoryError};

/// In-memory repository backed by a BTreeMap
pub struct MemoryRepository<E: Entity> {
    inner: Arc<RwLock<BTreeMap<E::Id, E>>>,
}

impl<E: Entity> MemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Clone for MemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: Entity> fmt::Debug for MemoryRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRepository")
            .field("len", &self.len())
            .finish()
    }
}

fn poisoned<T>(err: T) -> RepositoryError
where
    T: fmt::Display,
{
    RepositoryError::Poisoned(format!("failed to acquire lock: {}", err))
}

impl<E: Entity> Repository<E> for MemoryRepository<E> {
    fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, RepositoryError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.get(id).cloned())
    }

    fn save(&self, entity: &E) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.insert(entity.id().clone(), entity.clone());
        Ok(())
    }

    fn delete_by_id(&self, id: &E::Id) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.remove(id);
        Ok(())
    }

    fn all(&self) -> Box<dyn Iterator<Item = Result<E, RepositoryError>> + '_> {
        // snapshot so the read lock is not held across the caller's iteration
        match self.inner.read() {
            Ok(inner) => {
                let items: Vec<_> = inner.values().cloned().map(Ok).collect();
                Box::new(items.into_iter())
            }
            Err(err) => Box::new(std::iter::once(Err(poisoned(err)))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{File, Mode, UserId};

    fn dir(name: &str) -> File {
        File::new_dir(name, UserId::from("alice"), None, Mode::DIR | Mode::OWNER_RW)
    }

    #[test]
    fn test_save_find_delete() {
        let repo = MemoryRepository::<File>::new();
        let node = dir("docs");

        assert!(repo.find_by_id(node.id()).unwrap().is_none());
        repo.save(&node).unwrap();
        assert_eq!(repo.find_by_id(node.id()).unwrap(), Some(node.clone()));
        assert_eq!(repo.len(), 1);

        repo.delete_by_id(node.id()).unwrap();
        assert!(repo.find_by_id(node.id()).unwrap().is_none());

        // deleting again is fine
        repo.delete_by_id(node.id()).unwrap();
        assert!(repo.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let repo = MemoryRepository::<File>::new();
        let other = repo.clone();
        repo.save(&dir("a")).unwrap();
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_all() {
        let repo = MemoryRepository::<File>::new();
        repo.save(&dir("a")).unwrap();
        repo.save(&dir("b")).unwrap();

        let mut names: Vec<String> = repo
            .all()
            .map(|res| res.unwrap().filename().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
