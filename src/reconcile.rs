//! Peer group reconciliation
//!
//! A bind mount joins its origin's peer group when it is created and keeps
//! that id for life. Once the global FUSE mount is torn down and mounted
//! again it gets a new peer group, so any bind mount still carrying a
//! different id points at the dead instance.

use crate::mountinfo::{MountRecord, PeerGroup};
use crate::topology::{BindMounts, GlobalMounts};
use serde::{Deserialize, Serialize};

/// A bind mount that must be re-bound from the current global mount
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrokenMountPoint {
    /// Path inside the current global mount the bind mount should expose
    pub source_path: String,

    /// The stale bind mount
    pub mount_path: String,

    pub filesystem_type: String,

    pub read_only: bool,

    /// Times the stale path is stacked in the mount table
    pub mount_count: usize,

    /// `{namespace}-{datasetName}` the bind mount belongs to
    pub dataset_key: String,
}

/// Peer groups agree when both carry the same id or both are private
pub fn peer_groups_match(a: Option<PeerGroup>, b: Option<PeerGroup>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        (Some(_), None) | (None, Some(_)) => false,
    }
}

/// Every bind mount whose peer group differs from its dataset's global mount
///
/// Datasets without a global mount are skipped. Output is grouped by
/// dataset, each group in bind mount order.
pub fn broken_bind_mounts(globals: &GlobalMounts<'_>, binds: &BindMounts<'_>) -> Vec<BrokenMountPoint> {
    let mut broken = Vec::new();

    for (key, mounts) in binds {
        let Some(global) = globals.get(key) else {
            tracing::debug!(
                "No global mount for {}, skipping {} bind mount(s)",
                key,
                mounts.len()
            );
            continue;
        };

        for bind in mounts {
            if peer_groups_match(bind.peer_group, global.peer_group) {
                continue;
            }

            let point = broken_mount_point(key, global, bind);
            tracing::info!(
                dataset = %key,
                bind_peer_group = ?bind.peer_group,
                global_peer_group = ?global.peer_group,
                "Broken mount point {} (source {})",
                point.mount_path,
                point.source_path
            );
            broken.push(point);
        }
    }

    broken
}

fn broken_mount_point(key: &str, global: &MountRecord, bind: &MountRecord) -> BrokenMountPoint {
    BrokenMountPoint {
        source_path: join_subtree(&global.mount_path, &bind.subtree),
        mount_path: bind.mount_path.clone(),
        filesystem_type: bind.filesystem_type.clone(),
        read_only: bind.read_only,
        mount_count: bind.count,
        dataset_key: key.to_string(),
    }
}

/// Join a bind mount's subtree onto the global mount path, lexically cleaned
pub fn join_subtree(mount_path: &str, subtree: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for part in mount_path.split('/').chain(subtree.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    format!("/{}", parts.join("/"))
}
