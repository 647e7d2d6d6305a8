use super::record::{MountRecord, PeerGroup};
use thiserror::Error;

/// Fields before the optional-fields list: id, parent, major:minor, root,
/// mount point, mount options
const FIXED_FIELDS: usize = 6;

/// Fields after the `-` separator: fstype, source, super options
const TRAILING_FIELDS: usize = 3;

const SEPARATOR: &str = "-";

/// Why a single mount table line was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("expected at least 6 leading fields, found {0}")]
    TooFewFields(usize),

    #[error("invalid {name} field: {value:?}")]
    InvalidField { name: &'static str, value: String },

    #[error("optional fields are not terminated by '-'")]
    MissingSeparator,

    #[error("expected 3 fields after '-', found {0}")]
    TooFewTrailingFields(usize),

    #[error("invalid peer group in {0:?}")]
    InvalidPeerGroup(String),
}

/// Propagation tag carrying a peer group id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Propagation {
    Shared,
    Master,
}

/// Parse one line of the mount table
pub(crate) fn parse_line(line: &str) -> Result<MountRecord, LineError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < FIXED_FIELDS {
        return Err(LineError::TooFewFields(fields.len()));
    }

    // mount id and parent id are unused, but must be numeric
    for (name, value) in [("mount id", fields[0]), ("parent id", fields[1])] {
        if value.parse::<u64>().is_err() {
            return Err(LineError::InvalidField {
                name,
                value: value.to_string(),
            });
        }
    }
    if !fields[2].contains(':') {
        return Err(LineError::InvalidField {
            name: "major:minor",
            value: fields[2].to_string(),
        });
    }

    let subtree = unescape(fields[3]);
    let mount_path = unescape(fields[4]);
    let mount_options = fields[5];

    let separator = fields[FIXED_FIELDS..]
        .iter()
        .position(|f| *f == SEPARATOR)
        .map(|pos| pos + FIXED_FIELDS)
        .ok_or(LineError::MissingSeparator)?;

    let trailing = &fields[separator + 1..];
    if trailing.len() < TRAILING_FIELDS {
        return Err(LineError::TooFewTrailingFields(trailing.len()));
    }

    let peer_group = peer_group_from_optional(&fields[FIXED_FIELDS..separator])?;
    let filesystem_type = trailing[0];
    let super_options = trailing[2];

    Ok(MountRecord::new(
        subtree,
        mount_path,
        filesystem_type,
        peer_group,
        has_option(mount_options, "ro") || has_option(super_options, "ro"),
    ))
}

/// Pick the peer group out of the optional fields; `shared` wins over `master`
fn peer_group_from_optional(optional: &[&str]) -> Result<Option<PeerGroup>, LineError> {
    let mut shared = None;
    let mut master = None;

    for field in optional {
        match propagation_tag(field)? {
            Some((Propagation::Shared, group)) => shared = shared.or(Some(group)),
            Some((Propagation::Master, group)) => master = master.or(Some(group)),
            None => {}
        }
    }

    Ok(shared.or(master))
}

/// Parse a `shared:N` or `master:N` field; other tags yield `None`
fn propagation_tag(field: &str) -> Result<Option<(Propagation, PeerGroup)>, LineError> {
    let Some((tag, value)) = field.split_once(':') else {
        return Ok(None);
    };

    let propagation = match tag {
        "shared" => Propagation::Shared,
        "master" => Propagation::Master,
        _ => return Ok(None),
    };

    value
        .parse::<u32>()
        .map(|id| Some((propagation, PeerGroup(id))))
        .map_err(|_| LineError::InvalidPeerGroup(field.to_string()))
}

fn has_option(options: &str, name: &str) -> bool {
    options.split(',').any(|opt| opt == name)
}

/// Decode the kernel's `\NNN` octal escapes in a path field
///
/// The kernel escapes space, tab, newline and backslash this way. A
/// backslash not followed by a valid three-digit octal byte is kept as is.
pub fn unescape(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if let Some(byte) = octal_byte(&bytes[i + 1..]) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn octal_byte(digits: &[u8]) -> Option<u8> {
    let digits = digits.get(..3)?;
    let mut value: u32 = 0;
    for d in digits {
        if !(b'0'..=b'7').contains(d) {
            return None;
        }
        value = value * 8 + u32::from(d - b'0');
    }
    u8::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLOBAL_LINE: &str = "1764 1620 0:388 / /runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse ro,relatime shared:475 - fuse.juicefs JuiceFS:minio ro,user_id=0,group_id=0,default_permissions,allow_other";

    #[test]
    fn test_parse_global_mount_line() {
        let record = parse_line(GLOBAL_LINE).unwrap();
        assert_eq!(record.subtree, "/");
        assert_eq!(
            record.mount_path,
            "/runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse"
        );
        assert_eq!(record.filesystem_type, "fuse.juicefs");
        assert_eq!(record.peer_group, Some(PeerGroup(475)));
        assert!(record.read_only);
        assert_eq!(record.count, 1);
    }

    #[test]
    fn test_parse_private_mount() {
        let line = "1764 1620 0:388 / /runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse ro,relatime - fuse.juicefs JuiceFS:minio ro,allow_other";
        let record = parse_line(line).unwrap();
        assert_eq!(record.peer_group, None);
    }

    #[test]
    fn test_parse_root_filesystem() {
        let record = parse_line("15 0 259:3 / / rw,relatime shared:1 - ext4 /dev/root rw,data=ordered").unwrap();
        assert_eq!(record.mount_path, "/");
        assert_eq!(record.filesystem_type, "ext4");
        assert_eq!(record.peer_group, Some(PeerGroup(1)));
        assert!(!record.read_only);
    }

    #[test]
    fn test_read_only_from_super_options_only() {
        let line = "36 35 98:0 /mnt1 /mnt2 rw,noatime master:1 - ext3 /dev/root ro,errors=continue";
        assert!(parse_line(line).unwrap().read_only);
    }

    #[test]
    fn test_option_name_must_match_exactly() {
        // "rootcontext" and "errors=remount-ro" are not "ro"
        let line = "36 35 98:0 / /mnt rw,rootcontext=x - ext4 /dev/sda1 rw,errors=remount-ro";
        assert!(!parse_line(line).unwrap().read_only);
    }

    #[test]
    fn test_shared_preferred_over_master() {
        let line = "480 454 0:22 /data / ro,noatime master:1 shared:224 - btrfs /dev/mmcblk0p2 rw";
        assert_eq!(parse_line(line).unwrap().peer_group, Some(PeerGroup(224)));
    }

    #[test]
    fn test_master_used_when_not_shared() {
        let line = "482 480 0:5 /null /dev/null rw,nosuid master:2 - devtmpfs udev rw";
        assert_eq!(parse_line(line).unwrap().peer_group, Some(PeerGroup(2)));
    }

    #[test]
    fn test_other_tags_ignored() {
        let line = "50 20 0:40 / /mnt/x rw unbindable propagate_from:3 - tmpfs tmpfs rw";
        assert_eq!(parse_line(line).unwrap().peer_group, None);
    }

    #[test]
    fn test_non_numeric_peer_group_rejected() {
        let line = "1764 1620 0:388 / /runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse ro,relatime shared:abc - fuse.juicefs JuiceFS:minio ro";
        assert_eq!(
            parse_line(line),
            Err(LineError::InvalidPeerGroup("shared:abc".to_string()))
        );
    }

    #[test]
    fn test_missing_separator_rejected() {
        let line = "1764 1620 0:388 / /runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse ro,relatime shared:475 fuse.juicefs JuiceFS:minio ro,allow_other";
        assert_eq!(parse_line(line), Err(LineError::MissingSeparator));
    }

    #[test]
    fn test_separator_at_end_rejected() {
        let line = "1764 1620 0:388 / /runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse ro,relatime shared:475 fuse.juicefs JuiceFS:minio ro,allow_other -";
        assert_eq!(parse_line(line), Err(LineError::TooFewTrailingFields(0)));
    }

    #[test]
    fn test_short_line_rejected() {
        assert_eq!(parse_line("15 0 259:3 / /"), Err(LineError::TooFewFields(5)));
    }

    #[test]
    fn test_non_numeric_mount_id_rejected() {
        let err = parse_line("x 0 259:3 / / rw - ext4 /dev/root rw").unwrap_err();
        assert!(matches!(err, LineError::InvalidField { name: "mount id", .. }));
    }

    #[test]
    fn test_escaped_mount_path() {
        let line = r"90 25 0:50 /my\040dir /mnt/with\040space rw shared:7 - fuse.sshfs host:/ rw";
        let record = parse_line(line).unwrap();
        assert_eq!(record.subtree, "/my dir");
        assert_eq!(record.mount_path, "/mnt/with space");
    }

    #[test]
    fn test_unescape_plain_path_unchanged() {
        assert_eq!(
            unescape("/runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse"),
            "/runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse"
        );
    }

    #[test]
    fn test_unescape_octal() {
        assert_eq!(unescape(r"\123abc"), "Sabc");
        assert_eq!(unescape(r"a\011b\012c\134d"), "a\tb\nc\\d");
    }

    #[test]
    fn test_unescape_keeps_invalid_sequences() {
        assert_eq!(unescape(r"a\9bc"), r"a\9bc");
        assert_eq!(unescape(r"trailing\04"), r"trailing\04");
        assert_eq!(unescape(r"\777"), r"\777");
    }
}
