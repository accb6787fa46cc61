extern crate ffmpeg_next as ffmpeg;

use std::path::Path;
use std::sync::OnceLock;

use super::logger::{self, fault, verbose, warning};

use color_eyre::eyre::{self, Context};
use ffmpeg::codec::Context as CodecContext;
use ffmpeg::decoder::Video as DecoderVideo;
use ffmpeg::format::context::Input as FormatContext;
use ffmpeg::format::{input_with_dictionary, Pixel};
use ffmpeg::frame::Video as FrameVideo;
use ffmpeg::media::Type;
use ffmpeg::software::scaling::context::{Context as ScalingContext, Definition};
use ffmpeg::util::log as ffmpeglog;
use ffmpeg::{Dictionary, Packet as CodecPacket};
use image::RgbImage;

pub type Result<T> = eyre::Result<T>;

static FFMPEG_INITIALIZED: OnceLock<std::result::Result<(), ffmpeg::Error>> =
    OnceLock::new();

/// Hands out decoded frames in decode order until it runs dry.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// A sequential decode stream over the best video stream in a file.
///
/// All ffmpeg handles are owned by this struct, so the stream is closed whenever it goes
/// out of scope, no matter how the caller leaves.
pub struct FrameExtractor<L: logger::Logger = logger::LogLogger> {
    logger: L,

    ictx: FormatContext,
    decoder: DecoderVideo,
    converter: RgbConverter,

    video_stream_index: usize,
    orientation: Orientation,
    decoded: u64,
}

impl FrameExtractor<logger::LogLogger> {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::new_with_logger(path, logger::LogLogger)
    }
}

impl<L> FrameExtractor<L>
where
    L: logger::Logger,
{
    pub fn new_with_logger(path: impl AsRef<Path>, logger: L) -> Result<Self> {
        if let Err(e) = FFMPEG_INITIALIZED.get_or_init(|| {
            ffmpeg::init()?;
            ffmpeglog::set_level(ffmpeglog::Level::Error);
            Ok(())
        }) {
            return Err(e).wrap_err("Failed to initialize ffmpeg");
        }

        let options = {
            let mut options = Dictionary::new();
            options.set("analyzeduration", "10M");
            options
        };
        let path = path.as_ref();
        let mut ictx =
            input_with_dictionary(&path, options).wrap_err("Failed to open the file")?;

        let video = ictx
            .streams()
            .best(Type::Video)
            .ok_or_else(|| eyre::eyre!("No video stream"))?;
        let video_stream_index = video.index();

        let orientation = match get_orientation(&video) {
            Some(x) => x,
            None => {
                warning!(logger, "Got a weird orientation angle, ignoring");
                Orientation::Normal
            }
        };

        let decoder = CodecContext::from_parameters(video.parameters())
            .wrap_err("No codec found")?
            .decoder()
            .video()
            .wrap_err("No codec found, of type video (?)")?;

        ictx.streams_mut()
            .filter(|stream| stream.index() != video_stream_index)
            .for_each(|mut stream| stream_set_discard_all(&mut stream));

        let width = decoder.width();
        let height = decoder.height();
        verbose!(logger, "Opened a {}x{} video stream", width, height);

        Ok(Self {
            logger,
            ictx,
            decoder,
            converter: RgbConverter::default(),
            video_stream_index,
            orientation,
            decoded: 0,
        })
    }

    /// The next frame in decode order, or `None` when the stream is exhausted.
    pub fn next(&mut self) -> Result<Option<RgbImage>> {
        loop {
            let mut frame = FrameVideo::empty();
            // avcodec_receive_frame
            // https://ffmpeg.org/doxygen/trunk/group__lavc__decoding.html#ga11e6542c4e66d3028668788a1a74217c
            match self.decoder.receive_frame(&mut frame) {
                Ok(()) => {
                    self.decoded += 1;
                    let img = self.converter.convert(&frame)?;
                    return Ok(Some(undo_rotation(img, self.orientation)));
                }
                Err(ffmpeg::Error::Other {
                    errno: libc::EAGAIN,
                }) => (),
                Err(ffmpeg::Error::Eof) => return Ok(None),
                Err(e) => {
                    return Err(e)
                        .wrap_err("Decoder error when receiving a frame from it");
                }
            }

            self.feed_decoder()?;
        }
    }

    /// Sends the next packet of the video stream to the decoder, or EOF if there are none
    /// left.
    fn feed_decoder(&mut self) -> Result<()> {
        loop {
            // http://ffmpeg.org/doxygen/trunk/group__lavf__decoding.html#ga4fdb3084415a82e3810de6ee60e46a61
            let mut packet = CodecPacket::empty();
            match packet.read(&mut self.ictx) {
                Ok(()) if packet.stream() == self.video_stream_index => {
                    match self.decoder.send_packet(&packet) {
                        Ok(()) => return Ok(()),
                        Err(e) => fault!(self.logger, "Failed to decode a packet: {}", e),
                    }
                }
                Ok(()) => continue,
                Err(ffmpeg::Error::Eof) => {
                    return self
                        .decoder
                        .send_eof()
                        .wrap_err("Failed to send EOF to the decoder");
                }
                Err(e) => {
                    eyre::bail!("Failed to read a packet from the stream: {e}");
                }
            }
        }
    }
}

impl<L: logger::Logger> FrameSource for FrameExtractor<L> {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        self.next()
    }
}

impl<L: logger::Logger> Drop for FrameExtractor<L> {
    fn drop(&mut self) {
        let decoded = self.decoded;
        verbose!(self.logger, "Closing the decode stream after {} frames", decoded);
    }
}

/// Converts decoded frames to RGB24. The scaler is made from the first frame and remade
/// whenever the size or pixel format of the frames changes.
#[derive(Default)]
struct RgbConverter {
    scaler: Option<ScalingContext>,
}

impl RgbConverter {
    fn convert(&mut self, frame: &FrameVideo) -> Result<RgbImage> {
        let mut scaler = match self.scaler.take() {
            Some(scaler) if accepts(scaler.input(), frame) => scaler,
            _ => rgb_scaler(frame)?,
        };

        let mut converted = FrameVideo::empty();
        let ret = scaler.run(frame, &mut converted);
        self.scaler = Some(scaler);
        ret.wrap_err("Failed to convert the decoded frame")?;

        create_rust_image(&converted)
    }
}

fn accepts(input: &Definition, frame: &FrameVideo) -> bool {
    input.format == frame.format()
        && input.width == frame.width()
        && input.height == frame.height()
}

fn rgb_scaler(frame: &FrameVideo) -> Result<ScalingContext> {
    eyre::ensure!(frame.format() != Pixel::None, "No pixel format");
    ScalingContext::get(
        frame.format(),
        frame.width(),
        frame.height(),
        Pixel::RGB24,
        frame.width(),
        frame.height(),
        ffmpeg::software::scaling::Flags::FAST_BILINEAR,
    )
    .wrap_err("Failed to create a pixel format converter")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Orientation {
    Normal,
    Left,
    Right,
    Upside,
}

fn get_orientation(video: &ffmpeg::Stream) -> Option<Orientation> {
    for data in video.side_data() {
        if data.kind() != ffmpeg::packet::side_data::Type::DisplayMatrix {
            continue;
        }
        let rot = unsafe {
            ffmpeg_sys_next::av_display_rotation_get(data.data().as_ptr() as *const i32)
        };

        if rot.is_finite() {
            return orientation_from_degrees(rot);
        }
    }

    Some(Orientation::Normal)
}

fn orientation_from_degrees(rot: f64) -> Option<Orientation> {
    match rot.round() as i32 {
        -90 => Some(Orientation::Right),
        90 => Some(Orientation::Left),
        0 => Some(Orientation::Normal),
        180 | -180 => Some(Orientation::Upside),
        _ => None,
    }
}

fn undo_rotation(img: RgbImage, ori: Orientation) -> RgbImage {
    match ori {
        Orientation::Normal => img,
        Orientation::Right => image::imageops::rotate90(&img),
        Orientation::Left => image::imageops::rotate270(&img),
        Orientation::Upside => image::imageops::rotate180(&img),
    }
}

/// Copies an RGB24 frame into an image, dropping any padding at the end of each line.
fn create_rust_image(converted: &FrameVideo) -> Result<RgbImage> {
    eyre::ensure!(
        converted.format() == Pixel::RGB24,
        "Expected an RGB24 frame, got {:?}",
        converted.format()
    );

    let width = converted.width();
    let height = converted.height();
    let src_linesize = converted.stride(0);
    let trg_linesize = 3 * width as usize;
    let data = converted.data(0);
    eyre::ensure!(src_linesize >= trg_linesize, "Frame lines are too short");

    let pixels = if src_linesize == trg_linesize {
        data[..trg_linesize * height as usize].to_vec()
    } else {
        data.chunks(src_linesize)
            .take(height as usize)
            .flat_map(|line| &line[..trg_linesize])
            .copied()
            .collect()
    };

    RgbImage::from_vec(width, height, pixels)
        .ok_or_else(|| eyre::eyre!("The frame buffer is too small for {width}x{height}"))
}

fn stream_set_discard_all(stream: &mut ffmpeg::StreamMut<'_>) {
    unsafe {
        let ptr = stream.as_mut_ptr();
        if !ptr.is_null() {
            (*ptr).discard = ffmpeg_sys_next::AVDiscard::AVDISCARD_ALL;
        }
    }
}
