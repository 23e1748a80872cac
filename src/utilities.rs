//! Internal FFmpeg helpers for the video source.
//!
//! Row-padding removal and timestamp ↔ frame-index conversions.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy an RGB24 FFmpeg frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3).
/// The result can be passed straight to [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        buffer
    }
}

/// Rescale a PTS value from stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Frame index of a decoded frame, relative to the stream's first PTS.
pub(crate) fn pts_to_frame_index(
    pts: i64,
    start_pts: i64,
    time_base: Rational,
    frames_per_second: f64,
) -> u64 {
    let seconds = pts_to_seconds(pts - start_pts, time_base);
    (seconds * frames_per_second).round().max(0.0) as u64
}

/// Container-level seek target for a frame index, in AV_TIME_BASE
/// (microseconds), as expected by `Input::seek`.
pub(crate) fn frame_index_to_seek_timestamp(
    frame_index: u64,
    frames_per_second: f64,
    start_microseconds: i64,
) -> i64 {
    let seconds = frame_index as f64 / frames_per_second;
    start_microseconds + (seconds * 1_000_000.0) as i64
}
