use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("repository codec error: {0}")]
    Codec(#[from] serde_json::Error),
    /// A poisoned lock in an in-process backend
    #[error("repository lock poisoned: {0}")]
    Poisoned(String),
    #[error("unhandled repository error: {0}")]
    Provider(#[from] anyhow::Error),
}

/// Something a [`Repository`] can hold, addressed by its own id.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Clone + Eq + Ord + Hash + Debug + Display + AsRef<str> + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;
}

/// Keyed persistence for one kind of entity.
pub trait Repository<E: Entity>: Send + Sync + Debug {
    /// Look up an entity, `Ok(None)` when it does not exist
    fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, RepositoryError>;

    /// Insert or replace the entity under its id
    fn save(&self, entity: &E) -> Result<(), RepositoryError>;

    /// Remove the entity. Removing a missing id is not an error.
    fn delete_by_id(&self, id: &E::Id) -> Result<(), RepositoryError>;

    /// Scan every stored entity. Individual records may fail to load
    ///  without ending the scan.
    fn all(&self) -> Box<dyn Iterator<Item = Result<E, RepositoryError>> + '_>;
}
