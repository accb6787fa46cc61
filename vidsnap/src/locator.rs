use std::{ffi::OsString, io, path::Path};

use snapshot_common::utils::fsutils;

/// Recognized video file extensions, compared case-insensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// File names in `dir` that look like videos, in directory listing order.
pub fn find_videos(dir: impl AsRef<Path>) -> io::Result<Vec<OsString>> {
    let mut names = fsutils::entry_names(dir)?;
    names.retain(|name| fsutils::has_extension_ignore_case(name, VIDEO_EXTENSIONS));
    Ok(names)
}
