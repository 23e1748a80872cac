//! Key-frame selection pipeline.
//!
//! [`KeyframeSelector`] walks a [`FrameSource`] once, front to back:
//!
//! 1. The first frame is always kept as the cover, refined to the sharpest
//!    frame among the first few.
//! 2. Every `stride`-th frame is compared with the previously compared one.
//!    A detected boundary far enough from the last accepted one is refined
//!    to the sharpest nearby frame and kept.
//! 3. When more frames were kept than allowed, the sharpest ones win and are
//!    presented in chronological order.
//!
//! A single still image (a thumbnail with no video behind it) short-circuits
//! all of this and becomes the whole result.
//!
//! # Example
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use scenepick::{KeyframeSelector, MemorySource, SelectionInput, SelectionOptions};
//!
//! let mut frames = vec![RgbImage::from_pixel(32, 32, Rgb([20, 20, 20])); 10];
//! frames.extend(vec![RgbImage::from_pixel(32, 32, Rgb([200, 40, 40])); 10]);
//! let mut source = MemorySource::new(frames, 10.0);
//!
//! let selector = KeyframeSelector::new(SelectionOptions::new());
//! let selected = selector.select(SelectionInput::Video(&mut source))?;
//! assert_eq!(selected.len(), 2);
//! assert_eq!(selected[1].index(), 10);
//! # Ok::<(), scenepick::ScenePickError>(())
//! ```

use image::{DynamicImage, RgbImage};
use serde_json::{Value, json};

use crate::clarity::ClarityScorer;
use crate::configuration::SelectionOptions;
use crate::error::ScenePickError;
use crate::finder::ClearestFrameFinder;
use crate::progress::{OperationType, ProgressTracker};
use crate::scene::SceneChangeDetector;
use crate::source::FrameSource;

/// `change_rate` recorded for frames that have no predecessor to diff
/// against: the cover frame and a lone still image.
pub const FIRST_FRAME_CHANGE_RATE: f64 = 1.0;

// Absorbs float error in `index / fps` differences (0.6 - 0.3 < 0.3).
const TIME_EPSILON: f64 = 1e-9;

/// A selected key frame.
///
/// Immutable once produced; fields are exposed through accessors.
#[derive(Debug, Clone)]
pub struct ScoredFrame {
    image: RgbImage,
    index: u64,
    timestamp: f64,
    clarity: f64,
    change_rate: f64,
}

impl ScoredFrame {
    pub(crate) fn new(
        image: RgbImage,
        index: u64,
        timestamp: f64,
        clarity: f64,
        change_rate: f64,
    ) -> Self {
        Self {
            image,
            index,
            timestamp,
            clarity,
            change_rate,
        }
    }

    /// The frame pixels.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Consume the record and return its pixels.
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// The frame pixels as a [`DynamicImage`], ready to encode.
    pub fn to_dynamic_image(&self) -> DynamicImage {
        DynamicImage::ImageRgb8(self.image.clone())
    }

    /// Index of the boundary frame in the source.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Seconds from the start of the video (`index / frame_rate`).
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Sharpness score; higher is sharper.
    pub fn clarity(&self) -> f64 {
        self.clarity
    }

    /// How much the scene changed at this boundary, in `[0.0, 1.0]`.
    pub fn change_rate(&self) -> f64 {
        self.change_rate
    }

    /// The numeric fields as a JSON object (pixels excluded).
    pub fn to_json(&self) -> Value {
        json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "clarity": self.clarity,
            "change_rate": self.change_rate,
            "width": self.image.width(),
            "height": self.image.height(),
        })
    }
}

/// What the pipeline runs on.
pub enum SelectionInput<'a> {
    /// A decoded video.
    Video(&'a mut dyn FrameSource),
    /// A single still image (thumbnail-only mode).
    Still(RgbImage),
}

/// Mutable state of one pipeline run.
struct SelectionState {
    previous_frame: RgbImage,
    frame_count: u64,
    last_selected_time: f64,
    selected: Vec<ScoredFrame>,
}

/// Runs the key-frame selection pipeline.
///
/// A selector holds only configuration; each call to
/// [`select`](KeyframeSelector::select) owns its own state, so one selector
/// can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct KeyframeSelector {
    options: SelectionOptions,
    detector: SceneChangeDetector,
}

impl KeyframeSelector {
    /// Create a selector.
    pub fn new(options: SelectionOptions) -> Self {
        let detector = SceneChangeDetector::new(options.detector.clone());
        Self { options, detector }
    }

    /// The options this selector runs with.
    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    /// Select key frames from a video or a still image.
    ///
    /// The result is ordered by timestamp and never longer than the
    /// configured maximum.
    ///
    /// # Errors
    ///
    /// - [`ScenePickError::InvalidOption`] if the options do not validate.
    /// - [`ScenePickError::SourceUnavailable`] if the first frame cannot be
    ///   read or the source reports an unusable frame rate.
    /// - [`ScenePickError::NoScenesDetected`] if nothing was selected.
    pub fn select(&self, input: SelectionInput<'_>) -> Result<Vec<ScoredFrame>, ScenePickError> {
        self.options.validate()?;

        let selected = match input {
            SelectionInput::Still(image) => vec![self.select_still(image)],
            SelectionInput::Video(source) => self.select_video(source)?,
        };

        if selected.is_empty() {
            return Err(ScenePickError::NoScenesDetected);
        }
        Ok(selected)
    }

    fn select_still(&self, image: RgbImage) -> ScoredFrame {
        log::debug!(
            "Selecting from a still image ({}x{})",
            image.width(),
            image.height()
        );
        let clarity = ClarityScorer::score(&image);
        ScoredFrame::new(image, 0, 0.0, clarity, FIRST_FRAME_CHANGE_RATE)
    }

    fn select_video(
        &self,
        source: &mut dyn FrameSource,
    ) -> Result<Vec<ScoredFrame>, ScenePickError> {
        let frames_per_second = source.frame_rate();
        if !frames_per_second.is_finite() || frames_per_second <= 0.0 {
            return Err(ScenePickError::SourceUnavailable(format!(
                "invalid frame rate {frames_per_second}"
            )));
        }

        let options = &self.options;
        log::debug!(
            "Selecting key frames (fps={:.3}, stride={}, min_interval={:?}, max_frames={})",
            frames_per_second,
            options.stride,
            options.min_interval,
            options.max_frames
        );

        let mut progress = ProgressTracker::new(
            options.progress.clone(),
            OperationType::SceneDetection,
            source.frame_count_hint(),
            options.batch_size,
        );

        let first_index = source.position();
        let first_frame = match source.read_next() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                return Err(ScenePickError::SourceUnavailable(
                    "source produced no frames".to_string(),
                ));
            }
            Err(error) => {
                return Err(ScenePickError::SourceUnavailable(format!(
                    "first frame could not be read: {error}"
                )));
            }
        };
        progress.advance(first_index, 0);

        let cover = self.cover_frame(source, first_index, &first_frame, frames_per_second)?;
        let mut state = SelectionState {
            previous_frame: first_frame,
            frame_count: source.position(),
            last_selected_time: cover.timestamp(),
            selected: vec![cover],
        };

        let min_interval = options.min_interval.as_secs_f64();
        loop {
            let index = source.position();
            let frame = match source.read_next() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(error) => {
                    log::warn!("Skipping undecodable frame {index}: {error}");
                    state.frame_count = source.position();
                    progress.advance(index, state.selected.len());
                    if state.frame_count == index {
                        break;
                    }
                    continue;
                }
            };
            state.frame_count = source.position();
            progress.advance(index, state.selected.len());

            if index % options.stride != 0 {
                continue;
            }
            if frame.dimensions() != state.previous_frame.dimensions() {
                log::warn!(
                    "Skipping frame {index}: size {:?} differs from {:?}",
                    frame.dimensions(),
                    state.previous_frame.dimensions()
                );
                continue;
            }

            let detection = self.detector.detect(&state.previous_frame, &frame);
            let current_time = index as f64 / frames_per_second;

            if detection.is_new_scene
                && current_time - state.last_selected_time + TIME_EPSILON >= min_interval
            {
                let (image, clarity) =
                    self.refine(source, index, frame.clone(), options.refine_radius)?;
                log::debug!(
                    "Scene boundary at frame {index} ({current_time:.3}s, change {:.3}, \
                     clarity {clarity:.2})",
                    detection.change_magnitude
                );
                state.selected.push(ScoredFrame::new(
                    image,
                    index,
                    current_time,
                    clarity,
                    detection.change_magnitude,
                ));
                state.last_selected_time = current_time;
            }

            state.previous_frame = frame;
        }

        progress.finish(state.selected.len());
        log::debug!(
            "Read {} frames, {} boundaries accepted",
            state.frame_count,
            state.selected.len()
        );

        Ok(apply_capacity_policy(state.selected, options.max_frames))
    }

    /// The mandatory first result: the sharpest of the opening frames.
    ///
    /// Stamped like any boundary, so a source read from frame 0 yields
    /// index 0 at 0.0 s.
    fn cover_frame(
        &self,
        source: &mut dyn FrameSource,
        first_index: u64,
        first_frame: &RgbImage,
        frames_per_second: f64,
    ) -> Result<ScoredFrame, ScenePickError> {
        let (image, clarity) = self.refine(
            source,
            first_index,
            first_frame.clone(),
            self.options.cover_radius,
        )?;
        let timestamp = first_index as f64 / frames_per_second;
        Ok(ScoredFrame::new(
            image,
            first_index,
            timestamp,
            clarity,
            FIRST_FRAME_CHANGE_RATE,
        ))
    }

    /// Replace a candidate with the sharpest frame in its window, or keep it
    /// when the window yields nothing.
    ///
    /// The sequential read position must survive the search; if the source
    /// cannot get back to it, the run fails rather than silently skipping
    /// frames.
    fn refine(
        &self,
        source: &mut dyn FrameSource,
        center: u64,
        candidate: RgbImage,
        radius: u64,
    ) -> Result<(RgbImage, f64), ScenePickError> {
        let resume_at = source.position();
        let refined = match ClearestFrameFinder::find_clearest(&mut *source, center, radius) {
            Some(found) => (found.image, found.clarity),
            None => {
                let clarity = ClarityScorer::score(&candidate);
                (candidate, clarity)
            }
        };

        if source.position() != resume_at {
            log::debug!(
                "Read position {} after searching around frame {center}, expected {resume_at}",
                source.position()
            );
            if !source.seek(resume_at) {
                log::debug!("Seek back to frame {resume_at} reported failure");
            }
            if source.position() != resume_at {
                return Err(ScenePickError::SourceUnavailable(format!(
                    "cannot return to frame {resume_at} after searching around frame {center}"
                )));
            }
        }
        Ok(refined)
    }
}

/// Bound a selection to `max_frames`, preferring sharp frames.
///
/// When over capacity, frames are ranked by clarity (descending, stable, so
/// equal scores keep the earlier frame), the top `max_frames` are kept, and
/// the survivors are put back in timestamp order. Under capacity the input is
/// returned in timestamp order unchanged.
pub fn apply_capacity_policy(mut frames: Vec<ScoredFrame>, max_frames: usize) -> Vec<ScoredFrame> {
    if frames.len() > max_frames {
        frames.sort_by(|a, b| b.clarity.total_cmp(&a.clarity));
        frames.truncate(max_frames);
    }
    frames.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    frames
}
