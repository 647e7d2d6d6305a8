use super::parser::parse_line;
use super::record::MountRecord;
use crate::error::{DetectError, Result};
use std::collections::btree_map::{self, BTreeMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Immutable mount table snapshot keyed by mount path
///
/// Iteration is ordered by mount path, so every classification over the
/// same snapshot sees mounts in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountTable {
    mounts: BTreeMap<String, MountRecord>,
}

impl MountTable {
    /// Parse mount table text, skipping malformed lines
    ///
    /// A path listed more than once keeps its last record, with `count`
    /// holding the number of lines that named it.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_line(line) {
                Ok(record) => table.insert(record),
                Err(e) => {
                    tracing::warn!(line = index + 1, "Skipping malformed mount table line: {}", e);
                }
            }
        }

        tracing::debug!("Parsed {} mount points", table.len());
        table
    }

    /// Read and parse a table from `source`
    pub fn load<S: MountTableSource + ?Sized>(source: &S) -> Result<Self> {
        let text = source.read_table()?;
        Ok(Self::parse(&text))
    }

    /// Add a record; a repeated path replaces the earlier record and bumps its count
    pub fn insert(&mut self, mut record: MountRecord) {
        if let Some(previous) = self.mounts.get(&record.mount_path) {
            record.count = previous.count + 1;
            tracing::debug!(
                "Mount path {} listed {} times",
                record.mount_path,
                record.count
            );
        }
        self.mounts.insert(record.mount_path.clone(), record);
    }

    pub fn get(&self, mount_path: &str) -> Option<&MountRecord> {
        self.mounts.get(mount_path)
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// Records in mount path order
    pub fn iter(&self) -> btree_map::Values<'_, String, MountRecord> {
        self.mounts.values()
    }
}

impl FromIterator<MountRecord> for MountTable {
    fn from_iter<I: IntoIterator<Item = MountRecord>>(iter: I) -> Self {
        let mut table = Self::default();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

impl<'a> IntoIterator for &'a MountTable {
    type Item = &'a MountRecord;
    type IntoIter = btree_map::Values<'a, String, MountRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Where a detection cycle reads its mount table text from
pub trait MountTableSource {
    /// Return the whole table; failures are `MountTableUnreadable`
    fn read_table(&self) -> Result<String>;
}

/// A mount table file, normally `/proc/self/mountinfo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfoFile {
    path: PathBuf,
}

impl MountInfoFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MountTableSource for MountInfoFile {
    fn read_table(&self) -> Result<String> {
        let bytes = fs::read(&self.path).map_err(|source| DetectError::MountTableUnreadable {
            path: self.path.clone(),
            source,
        })?;

        // Mount paths may hold arbitrary bytes; only the offending path is mangled
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(
                    "Mount table {} is not valid UTF-8, decoding lossily",
                    self.path.display()
                );
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }
}

/// Mount table text already held in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountInfoText<'a>(pub &'a str);

impl MountTableSource for MountInfoText<'_> {
    fn read_table(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}
