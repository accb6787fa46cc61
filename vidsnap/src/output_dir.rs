use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::eyre::{self, Context};
use snapshot_common::utils::fsutils;

pub const SNAPSHOT_DIR_SUFFIX: &str = "_snapshots";

/// `<output_base>/<video stem>_snapshots`
pub fn snapshot_dir_for(
    video_file: impl AsRef<Path>,
    output_base: impl AsRef<Path>,
) -> PathBuf {
    let video_file = video_file.as_ref();
    let mut name = video_file
        .file_stem()
        .unwrap_or(video_file.as_os_str())
        .to_owned();
    name.push(SNAPSHOT_DIR_SUFFIX);
    output_base.as_ref().join(name)
}

/// Resolves the snapshot directory of a video, optionally wipes whatever an earlier run
/// left there, and makes sure it exists.
pub fn prepare_snapshot_dir(
    video_file: impl AsRef<Path>,
    output_base: impl AsRef<Path>,
    delete_existing: bool,
) -> eyre::Result<PathBuf> {
    let dir = snapshot_dir_for(video_file, output_base);

    if delete_existing
        && fsutils::remove_dir_if_exists(&dir)
            .wrap_err_with(|| format!("Failed to delete the snapshots folder {dir:?}"))?
    {
        log::info!("Deleted existing snapshots folder: {}", dir.display());
    }

    fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("Failed to create the snapshots folder {dir:?}"))?;

    Ok(dir)
}
