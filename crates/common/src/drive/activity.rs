use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::{ContentInfo, VersionSource};
use super::ids::{Fid, GroupId, UserId};
use super::mode::Mode;

/// When and by whom an activity happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub at: DateTime<Utc>,
    pub actor: UserId,
}

impl Stamp {
    pub fn now(actor: &UserId) -> Self {
        Self {
            at: Utc::now(),
            actor: actor.clone(),
        }
    }
}

/// One entry of a node's audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activity {
    Created {
        stamp: Stamp,
        name: String,
        dir: bool,
    },
    /// A child was removed from this directory
    Deleted {
        stamp: Stamp,
        child: Fid,
        name: String,
    },
    Renamed {
        stamp: Stamp,
        from: String,
        to: String,
    },
    /// A child was attached to this directory
    Added {
        stamp: Stamp,
        child: Fid,
        name: String,
    },
    VersionAdded {
        stamp: Stamp,
        content: ContentInfo,
        source: VersionSource,
    },
    GroupChanged {
        stamp: Stamp,
        from: Option<GroupId>,
        to: Option<GroupId>,
    },
    OwnerChanged {
        stamp: Stamp,
        from: UserId,
        to: UserId,
    },
    ModeChanged {
        stamp: Stamp,
        from: Mode,
        to: Mode,
    },
    /// Never emitted, kept so logs carrying it still decode
    Moved {
        stamp: Stamp,
        from: Fid,
        to: Fid,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Created,
    Deleted,
    Renamed,
    Added,
    VersionAdded,
    GroupChanged,
    OwnerChanged,
    ModeChanged,
    Moved,
}

impl Activity {
    pub fn stamp(&self) -> &Stamp {
        match self {
            Activity::Created { stamp, .. }
            | Activity::Deleted { stamp, .. }
            | Activity::Renamed { stamp, .. }
            | Activity::Added { stamp, .. }
            | Activity::VersionAdded { stamp, .. }
            | Activity::GroupChanged { stamp, .. }
            | Activity::OwnerChanged { stamp, .. }
            | Activity::ModeChanged { stamp, .. }
            | Activity::Moved { stamp, .. } => stamp,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.stamp().at
    }

    pub fn actor(&self) -> &UserId {
        &self.stamp().actor
    }

    pub fn kind(&self) -> ActivityKind {
        match self {
            Activity::Created { .. } => ActivityKind::Created,
            Activity::Deleted { .. } => ActivityKind::Deleted,
            Activity::Renamed { .. } => ActivityKind::Renamed,
            Activity::Added { .. } => ActivityKind::Added,
            Activity::VersionAdded { .. } => ActivityKind::VersionAdded,
            Activity::GroupChanged { .. } => ActivityKind::GroupChanged,
            Activity::OwnerChanged { .. } => ActivityKind::OwnerChanged,
            Activity::ModeChanged { .. } => ActivityKind::ModeChanged,
            Activity::Moved { .. } => ActivityKind::Moved,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityKind::Created => "created",
            ActivityKind::Deleted => "deleted",
            ActivityKind::Renamed => "renamed",
            ActivityKind::Added => "added",
            ActivityKind::VersionAdded => "version_added",
            ActivityKind::GroupChanged => "group_changed",
            ActivityKind::OwnerChanged => "owner_changed",
            ActivityKind::ModeChanged => "mode_changed",
            ActivityKind::Moved => "moved",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_encoding() {
        let activity = Activity::Renamed {
            stamp: Stamp::now(&UserId::from("alice")),
            from: "a.txt".to_string(),
            to: "b.txt".to_string(),
        };
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["kind"], "renamed");
        assert_eq!(value["stamp"]["actor"], "alice");

        let back: Activity = serde_json::from_value(value).unwrap();
        assert_eq!(back, activity);
        assert_eq!(back.kind(), ActivityKind::Renamed);
        assert_eq!(back.actor().as_str(), "alice");
    }

    #[test]
    fn test_kind_display_matches_tag() {
        let activity = Activity::ModeChanged {
            stamp: Stamp::now(&UserId::from("root")),
            from: Mode::OWNER_RW,
            to: Mode::OWNER_RW | Mode::OTHER_READ,
        };
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["kind"], activity.kind().to_string());
    }
}
