//! Typed views of mount paths
//!
//! Both classification rules work on a path split on `/`. An absolute path
//! keeps its empty leading field, so `/runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse`
//! has six fields.

use serde::{Deserialize, Serialize};

/// Fields a dataset mount path has at minimum:
/// `{_}/{root}/{runtimeType}/{namespace}/{runtimeName}/{runtimeTypeFuse}`
pub const MIN_DATASET_MOUNT_FIELDS: usize = 6;

/// Fields below the mount root: runtime type, namespace, runtime name, fuse dir
const DATASET_FIELDS_BELOW_ROOT: usize = 4;

/// Fields a kubelet CSI volume path has at minimum
pub const MIN_CSI_VOLUME_FIELDS: usize = 3;

/// Fields a kubelet volume sub-path has at minimum
pub const MIN_SUBPATH_FIELDS: usize = 4;

/// A path split on `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFields<'a> {
    fields: Vec<&'a str>,
}

impl<'a> PathFields<'a> {
    pub fn parse(path: &'a str) -> Self {
        Self {
            fields: path.split('/').collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).copied()
    }

    /// Field counted from the end, `1` being the last
    pub fn from_end(&self, n: usize) -> Option<&'a str> {
        self.fields
            .len()
            .checked_sub(n)
            .and_then(|index| self.get(index))
    }

    /// True when some field equals `segment` exactly
    pub fn contains_segment(&self, segment: &str) -> bool {
        self.fields.iter().any(|f| *f == segment)
    }

    /// Fields left after `prefix`, when `prefix` matches field by field
    pub fn strip_prefix(&self, prefix: &PathFields<'_>) -> Option<&[&'a str]> {
        if prefix.len() > self.len() {
            return None;
        }
        let (head, rest) = self.fields.split_at(prefix.len());
        (head == prefix.fields.as_slice()).then_some(rest)
    }

    /// Read this path as a dataset mount under `root`
    pub fn dataset_mount(&self, root: &PathFields<'_>) -> Option<DatasetMountPath<'a>> {
        if self.len() < MIN_DATASET_MOUNT_FIELDS {
            return None;
        }
        let rest = self.strip_prefix(root)?;
        if rest.len() < DATASET_FIELDS_BELOW_ROOT {
            return None;
        }
        Some(DatasetMountPath {
            runtime_type: rest[0],
            namespace: rest[1],
            runtime_name: rest[2],
            fuse_dir: rest[3],
        })
    }

    /// Read this path as a kubelet per-pod volume mount
    pub fn kubelet_volume(&self, convention: &KubeletConvention) -> Option<KubeletVolumePath<'a>> {
        if self.contains_segment(&convention.csi_volume_marker)
            && self.contains_segment(&convention.csi_mount_segment)
        {
            if self.len() < MIN_CSI_VOLUME_FIELDS {
                return None;
            }
            return self
                .from_end(2)
                .map(|volume| KubeletVolumePath::CsiVolume { volume });
        }

        if self.contains_segment(&convention.subpath_marker) {
            if self.len() < MIN_SUBPATH_FIELDS {
                return None;
            }
            return self
                .from_end(3)
                .map(|volume| KubeletVolumePath::SubPath { volume });
        }

        None
    }
}

/// `{root}/{runtimeType}/{namespace}/{runtimeName}/{runtimeTypeFuse}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetMountPath<'a> {
    pub runtime_type: &'a str,
    pub namespace: &'a str,
    pub runtime_name: &'a str,
    pub fuse_dir: &'a str,
}

impl DatasetMountPath<'_> {
    /// Dataset identity, `{namespace}-{runtimeName}`
    pub fn dataset_key(&self) -> String {
        format!("{}-{}", self.namespace, self.runtime_name)
    }
}

/// A per-pod view of a volume created by kubelet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KubeletVolumePath<'a> {
    /// `.../volumes/kubernetes.io~csi/{volume}/mount`
    CsiVolume { volume: &'a str },
    /// `.../volume-subpaths/{volume}/{container}/{index}`
    SubPath { volume: &'a str },
}

impl<'a> KubeletVolumePath<'a> {
    /// Dataset identity; the CSI volume name is `{namespace}-{datasetName}`
    pub fn dataset_key(&self) -> &'a str {
        match *self {
            KubeletVolumePath::CsiVolume { volume } | KubeletVolumePath::SubPath { volume } => {
                volume
            }
        }
    }
}

/// Path segments kubelet uses for per-pod volume directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeletConvention {
    pub csi_volume_marker: String,
    pub csi_mount_segment: String,
    pub subpath_marker: String,
}

impl Default for KubeletConvention {
    fn default() -> Self {
        Self {
            csi_volume_marker: "kubernetes.io~csi".to_string(),
            csi_mount_segment: "mount".to_string(),
            subpath_marker: "volume-subpaths".to_string(),
        }
    }
}
