use std::{io, path::PathBuf};

use clap::Parser;
use color_eyre::eyre;
use snapshot_common::bin_common::init::{init_eyre, init_logger};
use vidsnap::driver::{self, RunConfig};

#[derive(Parser)]
#[command()]
/// Save every Nth frame of each video in a folder as a jpeg.
///
/// Asks for the frame interval and whether to delete old snapshots, unless they are given
/// as flags.
struct Cli {
    /// Folder to read the videos from
    #[arg(long, default_value = "videos")]
    videos_dir: PathBuf,

    /// Folder to create the per-video snapshot folders in
    #[arg(long, default_value = "snapshots")]
    snapshots_dir: PathBuf,

    /// Frames between snapshots, skips the prompt
    #[arg(long)]
    interval: Option<String>,

    /// Delete previous snapshots (y/n), skips the prompt
    #[arg(long)]
    delete_existing: Option<String>,

    /// A file to additionally write the logs to
    #[arg(long)]
    logfile: Option<PathBuf>,

    /// Also log every written snapshot
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> eyre::Result<()> {
    init_eyre()?;
    let cli = Cli::parse();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    init_logger(cli.logfile.as_deref(), level)?;

    let mut input = io::stdin().lock();
    let mut output = io::stdout();

    let interval = match &cli.interval {
        Some(answer) => driver::interval_or_default(answer),
        None => driver::prompt_interval(&mut input, &mut output)?,
    };
    let delete_existing = match &cli.delete_existing {
        Some(answer) => driver::wants_delete(answer),
        None => driver::prompt_delete_existing(&mut input, &mut output)?,
    };

    let config = RunConfig {
        videos_dir: cli.videos_dir,
        snapshots_dir: cli.snapshots_dir,
        interval,
        delete_existing,
    };
    driver::run(&config)?;

    Ok(())
}
