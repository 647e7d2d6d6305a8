//! Kernel mount table parsing
//!
//! Reads the per-process mount table (`/proc/self/mountinfo` format, see
//! `proc(5)`) into a [`MountTable`] keyed by mount path. Each line has a
//! fixed prefix of fields, a variable list of optional propagation fields
//! terminated by a lone `-`, then the filesystem type, mount source and
//! superblock options:
//!
//! ```text
//! 1764 1620 0:388 / /runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse ro,relatime shared:475 - fuse.juicefs JuiceFS:minio ro,allow_other
//! ```
//!
//! A malformed line is skipped with a warning; it never blocks the rest of
//! the table.

mod parser;
mod record;
mod table;

pub use parser::unescape;
pub use record::{MountRecord, PeerGroup};
pub use table::{MountInfoFile, MountInfoText, MountTable, MountTableSource};
