//! Detector configuration
//!
//! Settings come from an optional TOML file, with the dataset mount root
//! falling back to the `MOUNT_ROOT` environment variable. Every key is
//! optional:
//!
//! ```toml
//! mountinfo_path = "/proc/self/mountinfo"
//! mount_root = "/runtime-mnt"
//!
//! [kubelet]
//! csi_volume_marker = "kubernetes.io~csi"
//! csi_mount_segment = "mount"
//! subpath_marker = "volume-subpaths"
//! ```

use crate::error::{DetectError, Result};
use crate::mount_path::{KubeletConvention, PathFields};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the dataset mount root
pub const MOUNT_ROOT_ENV: &str = "MOUNT_ROOT";

/// Mount table of the calling process
pub const DEFAULT_MOUNTINFO_PATH: &str = "/proc/self/mountinfo";

/// Settings for one detector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Mount table file to read each cycle
    pub mountinfo_path: PathBuf,

    /// Dataset mount root; `MOUNT_ROOT` is used when unset
    pub mount_root: Option<String>,

    /// Kubelet per-pod volume path segments
    pub kubelet: KubeletConvention,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            mountinfo_path: PathBuf::from(DEFAULT_MOUNTINFO_PATH),
            mount_root: None,
            kubelet: KubeletConvention::default(),
        }
    }
}

impl DetectorConfig {
    /// Load settings from a TOML file
    ///
    /// # Errors
    /// `DetectError::ConfigFile` if the file cannot be read or is not valid
    /// TOML for this structure.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| DetectError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| DetectError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve the mount root from this config or the environment
    pub fn resolve_mount_root(&self) -> Result<MountRoot> {
        MountRoot::resolve(self.mount_root.as_deref())
    }
}

/// Absolute path under which dataset FUSE mounts live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRoot(String);

impl MountRoot {
    /// Validate a mount root; it must be absolute and not `/` itself
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let trimmed = path.trim();

        if trimmed.is_empty() {
            return Err(DetectError::Configuration(
                "mount root is empty".to_string(),
            ));
        }
        if !trimmed.starts_with('/') {
            return Err(DetectError::Configuration(format!(
                "mount root {:?} is not an absolute path",
                trimmed
            )));
        }

        let normalized = trimmed.trim_end_matches('/');
        if normalized.is_empty() {
            return Err(DetectError::Configuration(
                "mount root cannot be the filesystem root".to_string(),
            ));
        }

        Ok(Self(normalized.to_string()))
    }

    /// Read the mount root from `MOUNT_ROOT`
    pub fn from_env() -> Result<Self> {
        match env::var(MOUNT_ROOT_ENV) {
            Ok(value) => Self::new(value),
            Err(_) => Err(DetectError::Configuration(format!(
                "{} is not set",
                MOUNT_ROOT_ENV
            ))),
        }
    }

    /// Use `configured` when present, otherwise the environment
    pub fn resolve(configured: Option<&str>) -> Result<Self> {
        let root = match configured {
            Some(path) => Self::new(path)?,
            None => Self::from_env()?,
        };
        tracing::debug!("Using mount root {}", root.as_str());
        Ok(root)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn fields(&self) -> PathFields<'_> {
        PathFields::parse(&self.0)
    }
}
