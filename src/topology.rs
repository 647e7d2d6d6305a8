//! Mount topology classification
//!
//! Splits a mount table into global mounts (one canonical FUSE mount per
//! dataset) and bind mounts (per-pod views of a dataset), both keyed by the
//! dataset identity `{namespace}-{datasetName}`. Paths that match neither
//! convention are not relevant and are skipped silently.

use crate::config::MountRoot;
use crate::mount_path::{KubeletConvention, PathFields};
use crate::mountinfo::{MountRecord, MountTable};
use std::collections::BTreeMap;

/// Dataset key → its global mount
pub type GlobalMounts<'t> = BTreeMap<String, &'t MountRecord>;

/// Dataset key → its bind mounts, in mount table order
pub type BindMounts<'t> = BTreeMap<String, Vec<&'t MountRecord>>;

/// Collect the global mount of every dataset under `root`
///
/// When two paths give the same key the later one in table order wins.
pub fn global_mounts<'t>(table: &'t MountTable, root: &MountRoot) -> GlobalMounts<'t> {
    let root_fields = root.fields();
    let mut globals = GlobalMounts::new();

    for mount in table {
        if !mount.mount_path.contains(root.as_str()) {
            continue;
        }

        let Some(dataset) = PathFields::parse(&mount.mount_path).dataset_mount(&root_fields) else {
            tracing::debug!("Skipping {}: not a dataset mount path", mount.mount_path);
            continue;
        };

        let key = dataset.dataset_key();
        if let Some(previous) = globals.insert(key.clone(), mount) {
            tracing::debug!(
                "Global mount {} for {} replaces {}",
                mount.mount_path,
                key,
                previous.mount_path
            );
        }
    }

    globals
}

/// Collect kubelet bind mounts grouped by dataset key
pub fn bind_mounts<'t>(table: &'t MountTable, convention: &KubeletConvention) -> BindMounts<'t> {
    let mut binds = BindMounts::new();

    for mount in table {
        if let Some(volume) = PathFields::parse(&mount.mount_path).kubelet_volume(convention) {
            binds
                .entry(volume.dataset_key().to_string())
                .or_default()
                .push(mount);
        }
    }

    binds
}
