pub mod driver;
pub mod frame_extractor;
pub mod interval;
pub mod locator;
pub mod output_dir;
pub mod snapshot;
