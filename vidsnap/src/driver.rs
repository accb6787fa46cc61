use std::{
    collections::HashMap,
    ffi::{OsStr, OsString},
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use color_eyre::eyre::{self, Context};

use crate::frame_extractor::logger::{
    fault, information, verbose, warning, LogLogger, Logger,
};
use crate::interval::{FrameInterval, DEFAULT_FRAME_INTERVAL};
use crate::locator;
use crate::output_dir::{prepare_snapshot_dir, snapshot_dir_for};
use crate::snapshot::{take_snapshots, SnapshotStats};

/// Everything a run needs, nothing is looked up from the environment.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Where the videos are read from.
    pub videos_dir: PathBuf,
    /// One `<name>_snapshots` folder per video is created in here.
    pub snapshots_dir: PathBuf,
    pub interval: FrameInterval,
    /// Wipe a video's snapshot folder before writing to it.
    pub delete_existing: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
    pub snapshots: u64,
}

/// Reads one line, EOF counts as an empty answer.
fn ask(
    question: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer)
}

pub fn prompt_interval(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<FrameInterval> {
    let answer = ask(
        "Enter frame interval (frames between snapshots): ",
        input,
        output,
    )?;
    Ok(interval_or_default(&answer))
}

/// Parses the interval, falling back to the default on anything that isn't a positive
/// whole number.
pub fn interval_or_default(answer: &str) -> FrameInterval {
    match FrameInterval::parse(answer) {
        Ok(interval) => interval,
        Err(e) => {
            log::warn!(
                "Invalid input for frame interval ({e}). Using default value of {DEFAULT_FRAME_INTERVAL}."
            );
            DEFAULT_FRAME_INTERVAL
        }
    }
}

pub fn prompt_delete_existing(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<bool> {
    let answer = ask(
        "Delete previous snapshots if they exist? (y/n): ",
        input,
        output,
    )?;
    Ok(wants_delete(&answer))
}

/// Anything starting with a `y` is a yes.
pub fn wants_delete(answer: &str) -> bool {
    answer.trim_start().to_lowercase().starts_with('y')
}

/// Takes snapshots of every video in the videos folder, one video at a time. A video that
/// fails is logged and skipped. Only failing to create the snapshots folder itself is an
/// error.
pub fn run(config: &RunConfig) -> eyre::Result<RunSummary> {
    run_with_logger(config, &LogLogger)
}

pub fn run_with_logger(
    config: &RunConfig,
    logger: &impl Logger,
) -> eyre::Result<RunSummary> {
    fs::create_dir_all(&config.snapshots_dir).wrap_err_with(|| {
        format!(
            "Failed to create the snapshots folder {:?}",
            config.snapshots_dir
        )
    })?;

    let videos_dir = config.videos_dir.display();
    let videos = match locator::find_videos(&config.videos_dir) {
        Ok(videos) => videos,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fault!(logger, "Videos folder '{videos_dir}' not found.");
            return Ok(RunSummary::default());
        }
        Err(e) => {
            fault!(logger, "Failed to list the videos folder '{videos_dir}': {e}");
            return Ok(RunSummary::default());
        }
    };

    let mut summary = RunSummary::default();
    let mut claimed_dirs: HashMap<PathBuf, OsString> = HashMap::new();

    for video in videos {
        let name = video.to_string_lossy();
        information!(logger, "Processing video: {name}");

        let dir = snapshot_dir_for(&video, &config.snapshots_dir);
        if let Some(earlier) = claimed_dirs.get(&dir) {
            warning!(
                logger,
                "'{}' and '{name}' share the snapshots folder '{}', their snapshots will \
                 be mixed",
                earlier.to_string_lossy(),
                dir.display()
            );
        } else {
            claimed_dirs.insert(dir, video.clone());
        }

        match process_video(&video, config, logger) {
            Ok(stats) => {
                summary.processed += 1;
                summary.snapshots += stats.snapshots;
            }
            Err(e) => {
                fault!(logger, "Skipping '{name}': {e:#}");
                summary.failed += 1;
            }
        }
    }

    information!(
        logger,
        "Done: {} videos processed, {} failed, {} snapshots written",
        summary.processed,
        summary.failed,
        summary.snapshots
    );

    Ok(summary)
}

/// Prepares the snapshot folder of one video in the videos folder and fills it.
pub fn process_video(
    video: &OsStr,
    config: &RunConfig,
    logger: &impl Logger,
) -> eyre::Result<SnapshotStats> {
    let video_path = config.videos_dir.join(video);
    eyre::ensure!(
        video_path.exists(),
        "Video file '{}' not found",
        video_path.display()
    );

    let dir = prepare_snapshot_dir(video, &config.snapshots_dir, config.delete_existing)?;
    let stats = take_snapshots(&video_path, config.interval, &dir)?;

    let name = video.to_string_lossy();
    information!(
        logger,
        "Finished processing '{name}'. Snapshots saved in '{}'.",
        dir.display()
    );
    verbose!(
        logger,
        "{} of {} frames saved from '{name}'",
        stats.snapshots,
        stats.frames
    );

    Ok(stats)
}
