use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::{Fid, UserId};
use crate::repository::Entity;

/// Global namespace registry entry: logical name to root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRoot {
    pub name: String,
    pub root: Fid,
}

impl Entity for NamedRoot {
    type Id = String;

    fn id(&self) -> &String {
        &self.name
    }
}

/// Private namespace registry entry: one user's named roots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoots {
    pub user: UserId,
    #[serde(default)]
    pub roots: BTreeMap<String, Fid>,
}

impl UserRoots {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            roots: BTreeMap::new(),
        }
    }
}

impl Entity for UserRoots {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.user
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Namespace {
    Global,
    Private { user: UserId },
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Global => f.write_str("global"),
            Namespace::Private { user } => write!(f, "private:{}", user),
        }
    }
}

/// A resolved root: which namespace, under which name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drive {
    pub namespace: Namespace,
    pub name: String,
    pub root: Fid,
}

impl fmt::Display for Drive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.namespace, self.name, self.root)
    }
}
