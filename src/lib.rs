//! Bindscan - detect stale FUSE bind mounts on a Kubernetes node
//!
//! A dataset's FUSE filesystem is mounted once per node (the global mount)
//! and bound into every pod that uses it. When the global mount is recreated,
//! pod bind mounts made from the old instance stay behind with the old peer
//! group. This library parses the mount table, groups mounts by dataset and
//! reports every bind mount whose peer group no longer matches.

pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod mount_path;
pub mod mountinfo;
pub mod output;
pub mod reconcile;
pub mod topology;

pub use config::{DetectorConfig, MountRoot};
pub use detector::{detect_broken_mount_points, detect_with_config, Detector};
pub use error::DetectError;
pub use reconcile::BrokenMountPoint;
