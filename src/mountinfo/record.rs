use serde::{Deserialize, Serialize};
use std::fmt;

/// Shared-subtree peer group id (`shared:N` / `master:N` in the mount table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerGroup(pub u32);

impl fmt::Display for PeerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One mounted filesystem from a mount table snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountRecord {
    /// Path inside the origin filesystem visible at this mount (the `root` field)
    pub subtree: String,

    /// Where the mount is attached; unique within one snapshot
    pub mount_path: String,

    /// Filesystem type, e.g. `fuse.juicefs`
    pub filesystem_type: String,

    /// Propagation peer group, `None` for a private mount
    pub peer_group: Option<PeerGroup>,

    /// Mounted read-only (per-mount or superblock `ro`)
    pub read_only: bool,

    /// How many lines of the table named this mount path
    pub count: usize,
}

impl MountRecord {
    /// Build a record seen once in the table
    pub fn new(
        subtree: impl Into<String>,
        mount_path: impl Into<String>,
        filesystem_type: impl Into<String>,
        peer_group: Option<PeerGroup>,
        read_only: bool,
    ) -> Self {
        Self {
            subtree: subtree.into(),
            mount_path: mount_path.into(),
            filesystem_type: filesystem_type.into(),
            peer_group,
            read_only,
            count: 1,
        }
    }
}
