//! Selection configuration.
//!
//! [`SelectionOptions`] is a builder that carries the pipeline's heuristic
//! constants, the detector tuning, and an optional progress callback. A
//! default-constructed value reproduces the stock behaviour: every second
//! frame compared, boundaries at least 0.3 s apart, at most six results.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use scenepick::{DetectorOptions, SelectionOptions};
//!
//! let options = SelectionOptions::new()
//!     .with_max_frames(8)
//!     .with_min_interval(Duration::from_millis(500))
//!     .with_detector(DetectorOptions::new().with_thresholds(0.05, 0.95));
//! assert!(options.validate().is_ok());
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ScenePickError;
use crate::finder::{BOUNDARY_WINDOW_RADIUS, COVER_WINDOW_RADIUS};
use crate::progress::{NoOpProgress, ProgressCallback};
use crate::scene::DetectorOptions;

/// Maximum number of frames kept by default.
pub const DEFAULT_MAX_FRAMES: usize = 6;

/// Default minimum spacing between accepted boundaries.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(300);

/// Default comparison stride (every second frame).
pub const DEFAULT_STRIDE: u64 = 2;

/// Configuration for a key-frame selection run.
#[derive(Clone)]
pub struct SelectionOptions {
    pub(crate) detector: DetectorOptions,
    pub(crate) min_interval: Duration,
    pub(crate) stride: u64,
    pub(crate) refine_radius: u64,
    pub(crate) cover_radius: u64,
    pub(crate) max_frames: usize,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
}

impl Debug for SelectionOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SelectionOptions")
            .field("detector", &self.detector)
            .field("min_interval", &self.min_interval)
            .field("stride", &self.stride)
            .field("refine_radius", &self.refine_radius)
            .field("cover_radius", &self.cover_radius)
            .field("max_frames", &self.max_frames)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionOptions {
    /// Create options with the stock heuristics.
    pub fn new() -> Self {
        Self {
            detector: DetectorOptions::default(),
            min_interval: DEFAULT_MIN_INTERVAL,
            stride: DEFAULT_STRIDE,
            refine_radius: BOUNDARY_WINDOW_RADIUS,
            cover_radius: COVER_WINDOW_RADIUS,
            max_frames: DEFAULT_MAX_FRAMES,
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Set the scene detector tuning.
    #[must_use]
    pub fn with_detector(mut self, detector: DetectorOptions) -> Self {
        self.detector = detector;
        self
    }

    /// Set the minimum time between two accepted boundaries.
    #[must_use]
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Compare only every `stride`-th frame against the previous compared
    /// frame. Frames in between are still read so timestamps stay exact.
    #[must_use]
    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = stride;
        self
    }

    /// Set the window radius used to refine detected boundaries.
    #[must_use]
    pub fn with_refine_radius(mut self, radius: u64) -> Self {
        self.refine_radius = radius;
        self
    }

    /// Set the window radius used to refine the cover frame.
    #[must_use]
    pub fn with_cover_radius(mut self, radius: u64) -> Self {
        self.cover_radius = radius;
        self
    }

    /// Set the maximum number of frames returned.
    #[must_use]
    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Fire the progress callback every `size` frames. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Detector tuning in use.
    pub fn detector(&self) -> &DetectorOptions {
        &self.detector
    }

    /// Minimum boundary spacing in use.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Comparison stride in use.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Maximum result size in use.
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Check that every option is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ScenePickError::InvalidOption`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ScenePickError> {
        if self.stride == 0 {
            return Err(ScenePickError::InvalidOption(
                "stride must be greater than zero".to_string(),
            ));
        }
        if self.max_frames == 0 {
            return Err(ScenePickError::InvalidOption(
                "max_frames must be greater than zero".to_string(),
            ));
        }

        let detector = &self.detector;
        for (name, value) in [
            ("min_threshold", detector.min_threshold),
            ("max_threshold", detector.max_threshold),
            ("block_factor", detector.block_factor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScenePickError::InvalidOption(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if detector.min_threshold > detector.max_threshold {
            return Err(ScenePickError::InvalidOption(format!(
                "min_threshold ({}) exceeds max_threshold ({})",
                detector.min_threshold, detector.max_threshold
            )));
        }
        if detector.block_grid == 0 {
            return Err(ScenePickError::InvalidOption(
                "block_grid must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
