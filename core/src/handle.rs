use std::fmt;
use std::str::FromStr;

use crate::FatDirError;

/// Data-area cluster index of a directory entry. Cluster 0 is always the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirHandle(u16);

impl DirHandle {
    pub const ROOT: DirHandle = DirHandle(0);

    pub fn new(cluster: u16) -> Self {
        Self(cluster)
    }

    pub fn cluster(self) -> u16 {
        self.0
    }

    pub fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DirHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DirHandle {
    type Err = FatDirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u16>()
            .map(DirHandle)
            .map_err(|_| FatDirError::InvalidInput(format!("Invalid directory handle: '{}'", s)))
    }
}
