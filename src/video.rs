//! FFmpeg-backed frame source for local video files.
//!
//! [`VideoSource`] opens a file, picks the best video stream, and decodes it
//! frame by frame into RGB. Seeking jumps to the nearest keyframe at or
//! before the target and decodes forward to the exact index; short forward
//! hops decode straight through instead.
//!
//! This module is available when the `video` feature is enabled (default).
//!
//! # Example
//!
//! ```no_run
//! use scenepick::{
//!     KeyframeSelector, ScenePickError, SelectionInput, SelectionOptions, VideoSource,
//! };
//!
//! let mut source = VideoSource::open("input.mp4")?;
//! let selector = KeyframeSelector::new(SelectionOptions::new());
//! for frame in selector.select(SelectionInput::Video(&mut source))? {
//!     println!("frame {} at {:.2}s", frame.index(), frame.timestamp());
//! }
//! # Ok::<(), ScenePickError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::error::ScenePickError;
use crate::source::FrameSource;
use crate::utilities::{
    frame_index_to_seek_timestamp, frame_to_rgb_buffer, pts_to_frame_index, pts_to_seconds,
};

// Forward seeks shorter than this decode through instead of re-seeking.
const FORWARD_DECODE_LIMIT: u64 = 120;

// Give up on a stream after this many consecutive demuxer errors.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 32;

/// A decoded video file, read as a sequence of RGB frames.
///
/// The file stays open for the lifetime of the value and is closed on drop.
/// Frame indices count decoded frames from the start of the stream; after a
/// seek they are re-derived from presentation timestamps.
pub struct VideoSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    time_base: Rational,
    start_pts: i64,
    start_microseconds: i64,
    frames_per_second: f64,
    frame_count: Option<u64>,
    width: u32,
    height: u32,
    position: u64,
    /// Frame decoded while seeking, handed out by the next read.
    pending: Option<Result<RgbImage, ScenePickError>>,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    eof_sent: bool,
    read_errors: u32,
    path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("video_stream_index", &self.video_stream_index)
            .field("frames_per_second", &self.frames_per_second)
            .field("frame_count", &self.frame_count)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a local video file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenePickError::SourceOpen`] if the file cannot be opened or
    /// its decoder cannot be created, and [`ScenePickError::NoVideoStream`] if
    /// it has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ScenePickError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video source: {}", path.display());

        let open_error = |reason: String| ScenePickError::SourceOpen {
            path: path.clone(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;
        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let (video_stream_index, time_base, start_pts, frames_per_second, frame_count, decoder) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or(ScenePickError::NoVideoStream)?;

            // AV_NOPTS_VALUE is i64::MIN.
            let start_pts = match stream.start_time() {
                i64::MIN => 0,
                pts => pts,
            };
            let frame_count = u64::try_from(stream.frames()).ok().filter(|&n| n > 0);
            let decoder = CodecContext::from_parameters(stream.parameters())
                .and_then(|context| context.decoder().video())
                .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

            (
                stream.index(),
                stream.time_base(),
                start_pts,
                stream_frame_rate(stream.avg_frame_rate(), stream.rate()),
                frame_count,
                decoder,
            )
        };

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err(open_error(format!("invalid video dimensions {width}x{height}")));
        }

        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| open_error(format!("Failed to create pixel converter: {error}")))?;

        let start_microseconds = (pts_to_seconds(start_pts, time_base) * 1_000_000.0) as i64;

        log::debug!(
            "Video stream {} ({}x{}, {:.3} fps, {:?} frames)",
            video_stream_index,
            width,
            height,
            frames_per_second,
            frame_count
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            time_base,
            start_pts,
            start_microseconds,
            frames_per_second,
            frame_count,
            width,
            height,
            position: 0,
            pending: None,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            eof_sent: false,
            read_errors: 0,
            path,
        })
    }

    /// Path of the opened file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pull the next decoded frame into `decoded_frame`.
    ///
    /// Returns `false` once the decoder is drained.
    fn decode_next(&mut self) -> bool {
        loop {
            match self.decoder.receive_frame(&mut self.decoded_frame) {
                Ok(()) => return true,
                Err(FfmpegError::Eof) => return false,
                Err(_) if self.eof_sent => return false,
                Err(_) => {}
            }
            self.feed_packet();
        }
    }

    /// Send the next video packet (or end-of-stream) to the decoder.
    fn feed_packet(&mut self) {
        let mut packet = Packet::empty();
        loop {
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    self.read_errors = 0;
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        log::warn!("Dropping undecodable video packet: {error}");
                    }
                    return;
                }
                Err(FfmpegError::Eof) => {
                    self.finish_stream();
                    return;
                }
                Err(error) => {
                    self.read_errors += 1;
                    if self.read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        log::warn!(
                            "Giving up on {} after repeated read errors: {error}",
                            self.path.display()
                        );
                        self.finish_stream();
                        return;
                    }
                    log::debug!("Skipping unreadable packet: {error}");
                }
            }
        }
    }

    fn finish_stream(&mut self) {
        if let Err(error) = self.decoder.send_eof() {
            log::debug!("Decoder rejected end of stream: {error}");
        }
        self.eof_sent = true;
    }

    /// Convert the current `decoded_frame` to an RGB image.
    fn convert_decoded(&mut self) -> Result<RgbImage, ScenePickError> {
        self.scaler
            .run(&self.decoded_frame, &mut self.rgb_frame)
            .map_err(|error| ScenePickError::FrameDecode(error.to_string()))?;
        let buffer = frame_to_rgb_buffer(&self.rgb_frame, self.width, self.height);
        RgbImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
            ScenePickError::FrameDecode(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })
    }

    fn decoded_frame_index(&self) -> u64 {
        let pts = self
            .decoded_frame
            .timestamp()
            .or_else(|| self.decoded_frame.pts())
            .unwrap_or(self.start_pts);
        pts_to_frame_index(pts, self.start_pts, self.time_base, self.frames_per_second)
    }

    /// Skip frames by decoding forward from the current position.
    fn decode_forward_to(&mut self, index: u64) -> bool {
        while self.position < index {
            if self.pending.take().is_none() && !self.decode_next() {
                return false;
            }
            self.position += 1;
        }
        true
    }

    /// Seek the container to the keyframe before `index` and decode up to it.
    fn seek_and_decode_to(&mut self, index: u64) -> bool {
        let target =
            frame_index_to_seek_timestamp(index, self.frames_per_second, self.start_microseconds);
        if let Err(error) = self.input_context.seek(target, ..target) {
            log::debug!("Seek to frame {index} failed: {error}");
            return false;
        }
        self.decoder.flush();
        self.pending = None;
        self.eof_sent = false;

        let mut last_index = None;
        while self.decode_next() {
            let frame_index = self.decoded_frame_index();
            if frame_index >= index {
                self.pending = Some(self.convert_decoded());
                self.position = index;
                return true;
            }
            last_index = Some(frame_index);
        }

        // Ran off the end: the stream is drained, so report where it stopped.
        self.position = last_index.map_or(index, |last| last + 1).min(index);
        false
    }
}

impl FrameSource for VideoSource {
    fn read_next(&mut self) -> Result<Option<RgbImage>, ScenePickError> {
        if let Some(pending) = self.pending.take() {
            self.position += 1;
            return pending.map(Some);
        }
        if !self.decode_next() {
            return Ok(None);
        }
        self.position += 1;
        self.convert_decoded().map(Some)
    }

    fn seek(&mut self, index: u64) -> bool {
        if index == self.position {
            return true;
        }
        if index > self.position && index - self.position <= FORWARD_DECODE_LIMIT {
            return self.decode_forward_to(index);
        }
        log::debug!("Seeking from frame {} to {}", self.position, index);
        self.seek_and_decode_to(index)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn frame_rate(&self) -> f64 {
        self.frames_per_second
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.frame_count
    }
}

/// Frames per second from the stream's average rate, falling back to its
/// real base rate. Zero when neither is known.
fn stream_frame_rate(average: Rational, base: Rational) -> f64 {
    [average, base]
        .into_iter()
        .find(|rate| rate.numerator() > 0 && rate.denominator() > 0)
        .map_or(0.0, |rate| rate.numerator() as f64 / rate.denominator() as f64)
}
