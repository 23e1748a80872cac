//! Error types for the `scenepick` crate.
//!
//! This module defines [`ScenePickError`], the unified error type returned by
//! all fallible operations in the crate. Per-frame failures inside the
//! selection pipeline are absorbed and never reach the caller; only
//! source-level failures and the empty-result outcome are surfaced.

use std::{io::Error as IoError, path::PathBuf};

#[cfg(feature = "video")]
use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `scenepick` operations.
///
/// Every public method that can fail returns `Result<T, ScenePickError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScenePickError {
    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    SourceOpen {
        /// Path that was passed to the source constructor.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The frame source cannot produce frames (e.g. the first read failed).
    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A single frame could not be decoded.
    ///
    /// The selection pipeline skips such frames; this variant is only seen by
    /// callers reading a [`FrameSource`](crate::FrameSource) directly.
    #[error("Failed to decode frame: {0}")]
    FrameDecode(String),

    /// The pipeline ran to completion but selected zero frames.
    #[error("No scenes detected")]
    NoScenesDetected,

    /// A selection or export option is out of range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// An output file already exists and overwriting was not allowed.
    #[error("Output file already exists: {0}")]
    OutputExists(PathBuf),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while decoding or encoding pixels.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

#[cfg(feature = "video")]
impl From<FfmpegError> for ScenePickError {
    fn from(error: FfmpegError) -> Self {
        ScenePickError::Ffmpeg(error.to_string())
    }
}

impl ScenePickError {
    /// Returns `true` for the "nothing found" outcome, which callers usually
    /// report differently from a processing failure.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ScenePickError::NoScenesDetected)
    }
}
