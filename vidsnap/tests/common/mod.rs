// NOTE: every test will complain about the functions it doesn't use
#![allow(unused)]

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use tempfile::TempDir;

pub const TEST_VIDEO_FRAMES: u64 = 25;

/// Returns cargo's tmpdir
pub fn cargo_tmpdir() -> PathBuf {
    PathBuf::from(option_env!("CARGO_TARGET_TMPDIR").expect("no cargo tmpdir???"))
}

/// A fresh directory inside cargo's tmpdir, removed on drop
pub fn tmp_dir() -> TempDir {
    tempfile::tempdir_in(cargo_tmpdir()).expect("could not create temporary dir")
}

/// Renders a one second, 25 fps test pattern to `path` with the ffmpeg binary
pub fn create_test_video(path: &Path) {
    run_ffmpeg(&[], path);
}

/// A file with a video stream but not a single frame in it
pub fn create_empty_video(path: &Path) {
    run_ffmpeg(&["-frames:v", "0"], path);
}

fn run_ffmpeg(output_args: &[&str], path: &Path) {
    let status = std::process::Command::new("ffmpeg")
        .args(["-y", "-f", "lavfi", "-i", "testsrc=duration=1:rate=25:size=160x120"])
        .args(output_args)
        .arg(path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .stdin(Stdio::null())
        .status()
        .expect("failed to execute ffmpeg");
    assert!(status.success(), "ffmpeg failed to create {path:?}");
}

/// Sorted file names in `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("dir is readable")
        .map(|entry| {
            entry
                .expect("entry is readable")
                .file_name()
                .into_string()
                .expect("utf8 name")
        })
        .collect();
    names.sort();
    names
}
