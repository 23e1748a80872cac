//! # scenepick
//!
//! Pick a handful of sharp, visually distinct key frames from a video, for
//! preview galleries and visual summaries.
//!
//! The pipeline reads the video once. The opening frame is always kept as a
//! cover. Scene boundaries are found by comparing the luminance of frames,
//! both frame-wide and block by block, and each boundary is replaced by the
//! sharpest frame around it. When too many boundaries are found, the sharpest
//! frames win, and the result is always presented in chronological order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use scenepick::{
//!     KeyframeSelector, ScenePickError, SelectionInput, SelectionOptions, VideoSource,
//! };
//!
//! let mut source = VideoSource::open("input.mp4")?;
//! let selector = KeyframeSelector::new(SelectionOptions::new());
//! let frames = selector.select(SelectionInput::Video(&mut source))?;
//! scenepick::export_frames(&frames, "key_frames", &scenepick::ExportOptions::new())?;
//! # Ok::<(), ScenePickError>(())
//! ```
//!
//! ### Thumbnail only
//!
//! ```no_run
//! use scenepick::{KeyframeSelector, ScenePickError, SelectionInput};
//!
//! let still = scenepick::load_still("thumbnail.jpg")?;
//! let frames = KeyframeSelector::default().select(SelectionInput::Still(still))?;
//! assert_eq!(frames.len(), 1);
//! # Ok::<(), ScenePickError>(())
//! ```
//!
//! ## Building blocks
//!
//! - [`ClarityScorer`]: variance-of-Laplacian sharpness score
//! - [`SceneChangeDetector`]: global + block-wise luminance difference
//! - [`ClearestFrameFinder`]: sharpest frame in a window, cursor preserved
//! - [`KeyframeSelector`]: the full pipeline and its capacity policy
//! - [`FrameSource`]: the seekable frame supply the pipeline reads from
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `video` | FFmpeg-backed [`VideoSource`] (enabled by default) |
//! | `rayon` | `select_videos_parallel` runs one pipeline per video across threads |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! The `video` feature needs the FFmpeg development libraries installed on
//! your system.

pub mod clarity;
pub mod configuration;
mod conversion;
pub mod error;
pub mod export;
#[cfg(feature = "video")]
pub mod ffmpeg;
pub mod finder;
#[cfg(all(feature = "rayon", feature = "video"))]
mod parallel;
pub mod progress;
pub mod scene;
pub mod selection;
pub mod source;
pub mod still;
#[cfg(feature = "video")]
mod utilities;
#[cfg(feature = "video")]
pub mod video;

pub use clarity::ClarityScorer;
pub use configuration::SelectionOptions;
pub use error::ScenePickError;
pub use export::{ExportOptions, encode_jpeg, export_frames, export_frames_with_progress};
#[cfg(feature = "video")]
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use finder::{ClearestFrame, ClearestFrameFinder};
#[cfg(all(feature = "rayon", feature = "video"))]
pub use parallel::{VideoSelection, select_videos_parallel};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use scene::{DetectionResult, DetectorOptions, SceneChangeDetector};
pub use selection::{KeyframeSelector, ScoredFrame, SelectionInput, apply_capacity_policy};
pub use source::{CursorGuard, FrameSource, MemorySource};
pub use still::{decode_still, load_still};
#[cfg(feature = "video")]
pub use video::VideoSource;
