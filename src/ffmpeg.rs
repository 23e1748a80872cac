//! FFmpeg console verbosity.
//!
//! FFmpeg prints its own warnings to stderr independently of the Rust
//! [`log`](https://crates.io/crates/log) facade. Decoding damaged or unusual
//! videos can be noisy, so callers can tune it here without importing
//! `ffmpeg-next`.
//!
//! ```no_run
//! use scenepick::FfmpegLogLevel;
//!
//! let level: FfmpegLogLevel = "error".parse().unwrap();
//! scenepick::set_ffmpeg_log_level(level);
//! ```

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

use crate::error::ScenePickError;

/// FFmpeg internal log verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// No output at all.
    Quiet,
    /// Unrecoverable errors only.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Decoder and demuxer debugging output.
    Debug,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Debug => Level::Debug,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = ScenePickError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Ok(FfmpegLogLevel::Quiet),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "debug" => Ok(FfmpegLogLevel::Debug),
            other => Err(ScenePickError::InvalidOption(format!(
                "unknown FFmpeg log level '{other}'"
            ))),
        }
    }
}

/// Set FFmpeg's stderr verbosity. Does not affect `log` output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
