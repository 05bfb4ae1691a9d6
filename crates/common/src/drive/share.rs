use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::UserId;
use super::mode::Access;

/// Hash of a bearer token that unlocks a share
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareToken {
    pub hash: String,
    pub algorithm: String,
}

/// Explicit grant of access on a single node.
///
/// `expires_at` and `token` are recorded but not evaluated when
/// checking permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub token: Option<ShareToken>,
    #[serde(default)]
    pub users: Vec<UserId>,
    #[serde(default)]
    pub writable: bool,
}

impl Share {
    pub fn new(users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            expires_at: None,
            token: None,
            users: users.into_iter().collect(),
            writable: false,
        }
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn token(mut self, token: ShareToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Whether this share lets `user` perform `access`
    pub fn grants(&self, user: &UserId, access: Access) -> bool {
        if !self.users.contains(user) {
            return false;
        }
        match access {
            Access::Read => true,
            Access::Write => self.writable,
        }
    }
}
