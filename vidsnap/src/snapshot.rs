use std::path::Path;

use color_eyre::eyre::{self, Context};

use crate::frame_extractor::{ContextLogger, FrameExtractor, FrameSource};
use crate::interval::FrameInterval;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    /// Frames decoded from the video.
    pub frames: u64,
    /// Snapshots written to disk.
    pub snapshots: u64,
}

pub fn snapshot_file_name(snapshot_index: u64, frame_index: u64) -> String {
    format!("snapshot_{snapshot_index:04}_frame_{frame_index:04}.jpg")
}

/// Decodes `video` and saves every `interval`th frame into `output_dir`.
pub fn take_snapshots(
    video: impl AsRef<Path>,
    interval: FrameInterval,
    output_dir: impl AsRef<Path>,
) -> eyre::Result<SnapshotStats> {
    let video = video.as_ref();
    let mut extractor = FrameExtractor::new_with_logger(video, ContextLogger::new(video))
        .wrap_err_with(|| format!("Cannot open video file {video:?}"))?;
    write_snapshots(&mut extractor, interval, output_dir)
}

/// Drains `source`, writing the frames picked by `interval` as jpegs into `output_dir`.
pub fn write_snapshots(
    source: &mut impl FrameSource,
    interval: FrameInterval,
    output_dir: impl AsRef<Path>,
) -> eyre::Result<SnapshotStats> {
    let output_dir = output_dir.as_ref();
    let mut stats = SnapshotStats::default();

    while let Some(frame) = source
        .next_frame()
        .wrap_err_with(|| format!("Failed to decode frame {}", stats.frames))?
    {
        if interval.samples(stats.frames) {
            let path = output_dir.join(snapshot_file_name(stats.snapshots, stats.frames));
            frame
                .save(&path)
                .wrap_err_with(|| format!("Failed to write the snapshot {path:?}"))?;
            log::debug!("Wrote {}", path.display());
            stats.snapshots += 1;
        }
        stats.frames += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame_extractor;
    use image::{Rgb, RgbImage};
    use std::fs;

    /// Hands out `total` solid frames, the red channel encodes the frame index.
    struct FakeVideo {
        total: u64,
        next: u64,
    }

    impl FakeVideo {
        fn new(total: u64) -> Self {
            Self { total, next: 0 }
        }
    }

    impl FrameSource for FakeVideo {
        fn next_frame(&mut self) -> frame_extractor::Result<Option<RgbImage>> {
            if self.next >= self.total {
                return Ok(None);
            }
            let shade = (self.next * 30 % 256) as u8;
            self.next += 1;
            Ok(Some(RgbImage::from_pixel(8, 8, Rgb([shade, 0, 0]))))
        }
    }

    struct BrokenVideo {
        good_frames: u64,
    }

    impl FrameSource for BrokenVideo {
        fn next_frame(&mut self) -> frame_extractor::Result<Option<RgbImage>> {
            if self.good_frames == 0 {
                eyre::bail!("corrupt packet");
            }
            self.good_frames -= 1;
            Ok(Some(RgbImage::new(4, 4)))
        }
    }

    fn sorted_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn file_names_are_padded() {
        assert_eq!("snapshot_0000_frame_0000.jpg", snapshot_file_name(0, 0));
        assert_eq!("snapshot_0002_frame_0020.jpg", snapshot_file_name(2, 20));
        assert_eq!(
            "snapshot_12345_frame_123450.jpg",
            snapshot_file_name(12345, 123450)
        );
    }

    #[test]
    fn every_tenth_of_twenty_five() -> eyre::Result<()> {
        let tmp = tempfile::tempdir()?;
        let interval = FrameInterval::new(10)?;

        let stats = write_snapshots(&mut FakeVideo::new(25), interval, tmp.path())?;
        assert_eq!(SnapshotStats { frames: 25, snapshots: 3 }, stats);
        assert_eq!(
            vec![
                "snapshot_0000_frame_0000.jpg",
                "snapshot_0001_frame_0010.jpg",
                "snapshot_0002_frame_0020.jpg",
            ],
            sorted_names(tmp.path())
        );
        Ok(())
    }

    #[test]
    fn snapshots_are_the_right_frames() -> eyre::Result<()> {
        let tmp = tempfile::tempdir()?;
        write_snapshots(&mut FakeVideo::new(7), FrameInterval::new(3)?, tmp.path())?;

        for (n, frame) in [(0, 0), (1, 3), (2, 6)] {
            let path = tmp.path().join(snapshot_file_name(n, frame));
            let img = image::open(path)?.to_rgb8();
            assert_eq!((8, 8), img.dimensions());
            let red = img.get_pixel(4, 4).0[0] as i32;
            assert!((red - frame as i32 * 30).abs() <= 8, "frame {frame} had red {red}");
        }
        Ok(())
    }

    #[test]
    fn count_matches_ceil() -> eyre::Result<()> {
        for (frames, k) in [(1, 1), (5, 1), (9, 4), (12, 4), (13, 4), (3, 50)] {
            let tmp = tempfile::tempdir()?;
            let interval = FrameInterval::new(k)?;
            let stats =
                write_snapshots(&mut FakeVideo::new(frames), interval, tmp.path())?;
            assert_eq!(interval.snapshot_count(frames), stats.snapshots);
            assert_eq!(stats.snapshots as usize, sorted_names(tmp.path()).len());
        }
        Ok(())
    }

    #[test]
    fn zero_frames() -> eyre::Result<()> {
        let tmp = tempfile::tempdir()?;
        let stats = write_snapshots(
            &mut FakeVideo::new(0),
            FrameInterval::default(),
            tmp.path(),
        )?;
        assert_eq!(SnapshotStats::default(), stats);
        assert!(sorted_names(tmp.path()).is_empty());
        Ok(())
    }

    #[test]
    fn rerun_overwrites_same_names() -> eyre::Result<()> {
        let tmp = tempfile::tempdir()?;
        let interval = FrameInterval::new(2)?;
        write_snapshots(&mut FakeVideo::new(5), interval, tmp.path())?;
        let first = sorted_names(tmp.path());
        write_snapshots(&mut FakeVideo::new(5), interval, tmp.path())?;
        assert_eq!(first, sorted_names(tmp.path()));
        Ok(())
    }

    #[test]
    fn decode_error_keeps_earlier_snapshots() -> eyre::Result<()> {
        let tmp = tempfile::tempdir()?;
        let res = write_snapshots(
            &mut BrokenVideo { good_frames: 3 },
            FrameInterval::new(2)?,
            tmp.path(),
        );
        let err = res.unwrap_err();
        assert!(format!("{err:#}").contains("corrupt packet"));
        assert_eq!(2, sorted_names(tmp.path()).len());
        Ok(())
    }

    #[test]
    fn missing_output_dir() -> eyre::Result<()> {
        let tmp = tempfile::tempdir()?;
        let res = write_snapshots(
            &mut FakeVideo::new(1),
            FrameInterval::default(),
            tmp.path().join("gone"),
        );
        assert!(res.is_err());
        Ok(())
    }
}
