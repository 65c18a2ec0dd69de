//! Frame line classification and naming.

use crate::utils::config::NAME_SEPARATOR;

/// Whether `line` is a frame line (non-empty and starting with `marker`)
pub fn is_frame_line(line: &str, marker: char) -> bool {
    line.starts_with(marker)
}

/// Frame identifier for a frame line. The whole line is the key.
pub fn frame_id(line: &str) -> &str {
    line
}

/// Display name for a frame identifier
///
/// Drops the leading marker character and collapses every `"\t "`
/// sequence into a single space.
pub fn display_name(id: &str) -> String {
    let mut chars = id.chars();
    chars.next();
    chars.as_str().split(NAME_SEPARATOR).collect::<Vec<_>>().join(" ")
}
