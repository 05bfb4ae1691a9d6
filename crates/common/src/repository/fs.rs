use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::provider::{Entity, Repository, RepositoryError};

const EXTENSION: &str = "json";

/// Repository storing one JSON document per entity.
///
/// File names are the hex encoding of the entity id, so ids
///  never have to be valid path components themselves.
#[derive(Debug)]
pub struct FsRepository<E> {
    dir: PathBuf,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for FsRepository<E> {
    fn clone(&self) -> Self {
        Self {
            dir: self.dir.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> FsRepository<E> {
    /// Open (and create if needed) a repository rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!("FsRepository::open: {}", dir.display());
        Ok(Self {
            dir,
            _entity: PhantomData,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &E::Id) -> PathBuf {
        self.dir
            .join(format!("{}.{}", hex::encode(id.as_ref()), EXTENSION))
    }

    fn read(path: &Path) -> Result<E, RepositoryError> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}

impl<E: Entity> Repository<E> for FsRepository<E> {
    fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, RepositoryError> {
        match Self::read(&self.path_for(id)) {
            Ok(entity) => Ok(Some(entity)),
            Err(RepositoryError::Io(err)) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&self, entity: &E) -> Result<(), RepositoryError> {
        let path = self.path_for(entity.id());
        let tmp = path.with_extension("tmp");
        let data = serde_json::to_vec_pretty(entity)?;
        // rename over the old document so readers never see a partial write
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete_by_id(&self, id: &E::Id) -> Result<(), RepositoryError> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn all(&self) -> Box<dyn Iterator<Item = Result<E, RepositoryError>> + '_> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => return Box::new(std::iter::once(Err(err.into()))),
        };

        Box::new(entries.filter_map(|entry| {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => return Some(Err(err.into())),
            };
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                return None;
            }
            Some(Self::read(&path))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{File, Mode, UserId};

    #[test]
    fn test_fs_roundtrip_and_scan() {
        let temp = tempfile::TempDir::new().unwrap();
        let repo = FsRepository::<File>::open(temp.path().join("nodes")).unwrap();

        let node = File::new_dir("a/b?", UserId::from("alice"), None, Mode::DIR);
        repo.save(&node).unwrap();

        let loaded = repo.find_by_id(node.id()).unwrap().unwrap();
        assert_eq!(loaded, node);

        // stray files are ignored by the scan
        fs::write(repo.dir().join("README"), b"not a node").unwrap();
        let all: Vec<_> = repo.all().collect::<Result<_, _>>().unwrap();
        assert_eq!(all.len(), 1);

        repo.delete_by_id(node.id()).unwrap();
        assert!(repo.find_by_id(node.id()).unwrap().is_none());
        repo.delete_by_id(node.id()).unwrap();
    }

    #[test]
    fn test_corrupt_document_surfaces_in_scan() {
        let temp = tempfile::TempDir::new().unwrap();
        let repo = FsRepository::<File>::open(temp.path()).unwrap();
        fs::write(temp.path().join("00.json"), b"{ nope").unwrap();

        let results: Vec<_> = repo.all().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(RepositoryError::Codec(_))));
    }
}
