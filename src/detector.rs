//! Broken bind mount detection
//!
//! One detection cycle reads a fresh mount table snapshot, classifies it and
//! reconciles peer groups. A cycle holds no state between runs, so running it
//! again over an unchanged table gives the same result.

use crate::config::{DetectorConfig, MountRoot};
use crate::error::Result;
use crate::mount_path::KubeletConvention;
use crate::mountinfo::{MountInfoFile, MountTable, MountTableSource};
use crate::reconcile::{broken_bind_mounts, BrokenMountPoint};
use crate::topology::{bind_mounts, global_mounts};

/// Classification settings shared by every cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detector {
    root: MountRoot,
    kubelet: KubeletConvention,
}

impl Detector {
    pub fn new(root: MountRoot, kubelet: KubeletConvention) -> Self {
        Self { root, kubelet }
    }

    /// Build a detector, resolving the mount root from `config` or `MOUNT_ROOT`
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        Ok(Self::new(config.resolve_mount_root()?, config.kubelet.clone()))
    }

    /// Run one cycle over a table read from `source`
    ///
    /// # Errors
    /// Fails with `MountTableUnreadable` when the table cannot be read; no
    /// partial result is returned.
    pub fn detect<S: MountTableSource + ?Sized>(&self, source: &S) -> Result<Vec<BrokenMountPoint>> {
        let table = MountTable::load(source)?;
        Ok(self.detect_in(&table))
    }

    /// Run one cycle over an already parsed snapshot
    pub fn detect_in(&self, table: &MountTable) -> Vec<BrokenMountPoint> {
        let globals = global_mounts(table, &self.root);
        let binds = bind_mounts(table, &self.kubelet);
        tracing::debug!(
            "Found {} global mount(s) and bind mounts for {} dataset(s)",
            globals.len(),
            binds.len()
        );
        broken_bind_mounts(&globals, &binds)
    }
}

/// Detect broken mount points on this node with the default settings
///
/// Reads `/proc/self/mountinfo` and takes the mount root from `MOUNT_ROOT`.
///
/// # Errors
/// `Configuration` when `MOUNT_ROOT` is unset or invalid,
/// `MountTableUnreadable` when the mount table cannot be read.
pub fn detect_broken_mount_points() -> Result<Vec<BrokenMountPoint>> {
    detect_with_config(&DetectorConfig::default())
}

/// Detect broken mount points using `config`
pub fn detect_with_config(config: &DetectorConfig) -> Result<Vec<BrokenMountPoint>> {
    let detector = Detector::from_config(config)?;
    detector.detect(&MountInfoFile::new(&config.mountinfo_path))
}
