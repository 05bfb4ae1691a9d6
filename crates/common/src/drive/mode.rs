use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// POSIX-like permission bits plus a directory flag.
///
/// Only read and write bits are meaningful; there is no execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mode(u32);

/// Which kind of access a permission bit grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
}

impl Mode {
    pub const DIR: Mode = Mode(1 << 31);

    pub const OWNER_READ: Mode = Mode(0o400);
    pub const OWNER_WRITE: Mode = Mode(0o200);
    pub const GROUP_READ: Mode = Mode(0o040);
    pub const GROUP_WRITE: Mode = Mode(0o020);
    pub const OTHER_READ: Mode = Mode(0o004);
    pub const OTHER_WRITE: Mode = Mode(0o002);

    pub const OWNER_RW: Mode = Mode(0o600);
    pub const GROUP_RW: Mode = Mode(0o060);
    pub const OTHER_RW: Mode = Mode(0o006);

    const PERM_MASK: u32 = 0o777;

    pub const fn from_bits(bits: u32) -> Self {
        Mode(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Mode) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_dir(self) -> bool {
        self.contains(Mode::DIR)
    }

    /// The permission bits without the directory flag
    pub const fn perm(self) -> Mode {
        Mode(self.0 & Self::PERM_MASK)
    }

    pub const fn with_dir(self) -> Mode {
        Mode(self.0 | Mode::DIR.0)
    }

    pub const fn without_dir(self) -> Mode {
        Mode(self.0 & !Mode::DIR.0)
    }

    pub fn owner(self, access: Access) -> bool {
        match access {
            Access::Read => self.contains(Mode::OWNER_READ),
            Access::Write => self.contains(Mode::OWNER_WRITE),
        }
    }

    pub fn group(self, access: Access) -> bool {
        match access {
            Access::Read => self.contains(Mode::GROUP_READ),
            Access::Write => self.contains(Mode::GROUP_WRITE),
        }
    }

    /// The world bit, granting access to every subject
    pub fn other(self, access: Access) -> bool {
        match access {
            Access::Read => self.contains(Mode::OTHER_READ),
            Access::Write => self.contains(Mode::OTHER_WRITE),
        }
    }
}

impl BitOr for Mode {
    type Output = Mode;

    fn bitor(self, rhs: Mode) -> Mode {
        Mode(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mode {
    fn bitor_assign(&mut self, rhs: Mode) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Mode {
    /// `ls`-style rendering without execute columns, e.g. `drw-r---`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set: bool, c: char| if set { c } else { '-' };
        let rendered: String = [
            flag(self.is_dir(), 'd'),
            flag(self.contains(Mode::OWNER_READ), 'r'),
            flag(self.contains(Mode::OWNER_WRITE), 'w'),
            flag(self.contains(Mode::GROUP_READ), 'r'),
            flag(self.contains(Mode::GROUP_WRITE), 'w'),
            flag(self.contains(Mode::OTHER_READ), 'r'),
            flag(self.contains(Mode::OTHER_WRITE), 'w'),
        ]
        .iter()
        .collect();
        f.write_str(&rendered)
    }
}
