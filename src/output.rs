//! Report rendering for detection results

use crate::cli::OutputFormat;
use crate::reconcile::BrokenMountPoint;

/// Render one cycle's result in `format`
pub fn render(points: &[BrokenMountPoint], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(points)),
        OutputFormat::Json => serde_json::to_string_pretty(points),
    }
}

/// One line per broken mount point followed by a summary line
pub fn render_text(points: &[BrokenMountPoint]) -> String {
    let mut out = String::new();

    for point in points {
        out.push_str(&format!(
            "{} <- {} ({}, {}, count {}, dataset {})\n",
            point.mount_path,
            point.source_path,
            point.filesystem_type,
            if point.read_only { "ro" } else { "rw" },
            point.mount_count,
            point.dataset_key
        ));
    }

    if points.is_empty() {
        out.push_str("bindscan: no broken mount points");
    } else {
        out.push_str(&format!("bindscan: {} broken mount point(s)", points.len()));
    }

    out
}
