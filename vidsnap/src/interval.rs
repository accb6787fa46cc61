use std::{fmt, num::NonZeroU64, str::FromStr};

pub const DEFAULT_FRAME_INTERVAL: FrameInterval =
    FrameInterval(match NonZeroU64::new(10) {
        Some(n) => n,
        None => unreachable!(),
    });

/// Every how many frames a snapshot is taken. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameInterval(NonZeroU64);

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum IntervalError {
    #[error("the frame interval is not a whole number")]
    NotANumber,
    #[error("the frame interval must be at least 1, got {0}")]
    NotPositive(String),
}

impl FrameInterval {
    pub fn new(interval: i64) -> Result<Self, IntervalError> {
        u64::try_from(interval)
            .ok()
            .and_then(NonZeroU64::new)
            .map(FrameInterval)
            .ok_or_else(|| IntervalError::NotPositive(interval.to_string()))
    }

    /// Parses user input, surrounding whitespace is ignored. Any negative whole number is
    /// `NotPositive`, no matter how large.
    pub fn parse(input: &str) -> Result<Self, IntervalError> {
        let input = input.trim();
        if let Some(digits) = input.strip_prefix('-') {
            return if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                Err(IntervalError::NotPositive(input.to_string()))
            } else {
                Err(IntervalError::NotANumber)
            };
        }

        let num: u64 = input.parse().map_err(|_| IntervalError::NotANumber)?;
        NonZeroU64::new(num)
            .map(FrameInterval)
            .ok_or_else(|| IntervalError::NotPositive(input.to_string()))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Whether the frame at `frame_index` is one to keep.
    pub fn samples(self, frame_index: u64) -> bool {
        frame_index % self.0 == 0
    }

    /// How many snapshots a video with `total_frames` frames yields.
    pub fn snapshot_count(self, total_frames: u64) -> u64 {
        total_frames.div_ceil(self.get())
    }
}

impl Default for FrameInterval {
    fn default() -> Self {
        DEFAULT_FRAME_INTERVAL
    }
}

impl FromStr for FrameInterval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FrameInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parsing() {
        assert_eq!(3, FrameInterval::parse("3").unwrap().get());
        assert_eq!(7, FrameInterval::parse("  7\n").unwrap().get());
        assert_eq!(Err(IntervalError::NotANumber), FrameInterval::parse("abc"));
        assert_eq!(Err(IntervalError::NotANumber), FrameInterval::parse(""));
        assert_eq!(Err(IntervalError::NotANumber), FrameInterval::parse("2.5"));
        assert_eq!(Err(IntervalError::NotANumber), FrameInterval::parse("-"));
        assert_eq!(Err(IntervalError::NotANumber), FrameInterval::parse("--3"));
        assert_eq!(
            Err(IntervalError::NotPositive("0".to_string())),
            FrameInterval::parse("0")
        );
        assert_eq!(
            Err(IntervalError::NotPositive("-4".to_string())),
            FrameInterval::parse("-4")
        );
    }

    #[test]
    fn parsing_beyond_signed_range() {
        assert_eq!(
            u64::MAX,
            FrameInterval::parse("18446744073709551615").unwrap().get()
        );
        assert_eq!(
            1 << 63,
            FrameInterval::parse("9223372036854775808").unwrap().get()
        );
        assert_eq!(
            Err(IntervalError::NotPositive("-9223372036854775809".to_string())),
            FrameInterval::parse("-9223372036854775809")
        );
        assert_eq!(
            Err(IntervalError::NotANumber),
            FrameInterval::parse("18446744073709551616")
        );
    }

    #[test]
    fn new_rejects_non_positive() {
        assert_eq!(5, FrameInterval::new(5).unwrap().get());
        assert_eq!(
            Err(IntervalError::NotPositive("0".to_string())),
            FrameInterval::new(0)
        );
        assert_eq!(
            Err(IntervalError::NotPositive("-1".to_string())),
            FrameInterval::new(-1)
        );
    }

    #[test]
    fn default_is_ten() {
        assert_eq!(10, FrameInterval::default().get());
    }

    #[test]
    fn sampling() {
        let k = FrameInterval::new(10).unwrap();
        let sampled: Vec<u64> = (0..25).filter(|&i| k.samples(i)).collect();
        assert_eq!(vec![0, 10, 20], sampled);

        let one = FrameInterval::new(1).unwrap();
        assert!((0..5).all(|i| one.samples(i)));
    }

    #[test]
    fn snapshot_count_is_ceil() {
        for k in 1..=7 {
            let interval = FrameInterval::new(k).unwrap();
            for frames in 0..40 {
                let expected =
                    (0..frames).filter(|&i| interval.samples(i)).count() as u64;
                assert_eq!(
                    expected,
                    interval.snapshot_count(frames),
                    "k={k} frames={frames}"
                );
            }
        }
    }
}
