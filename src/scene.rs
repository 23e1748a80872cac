//! Scene change detection.
//!
//! Compares two consecutive frames by their luminance difference, both over
//! the whole frame and over a grid of equal blocks. A boundary is declared
//! when the frame-wide change sits inside a "plausible cut" band, or when any
//! single block changes far more than the frame average would reveal.
//!
//! # Example
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use scenepick::SceneChangeDetector;
//!
//! let detector = SceneChangeDetector::default();
//! let dark = RgbImage::from_pixel(32, 32, Rgb([10, 10, 10]));
//! let bright = RgbImage::from_pixel(32, 32, Rgb([120, 120, 120]));
//!
//! let result = detector.detect(&dark, &bright);
//! assert!(result.is_new_scene);
//! ```

use image::{GrayImage, RgbImage};

use crate::conversion::to_luma;

/// Outcome of comparing two frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionResult {
    /// Whether the second frame starts a new scene.
    pub is_new_scene: bool,
    /// The larger of the global change rate and the largest block change,
    /// in `[0.0, 1.0]`.
    pub change_magnitude: f64,
}

/// Scene detector tuning.
///
/// The defaults are empirically tuned heuristics: a 4×4 grid, a global
/// change band of `[0.10, 0.90]`, and a block trigger at `0.8 × 0.90`.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorOptions {
    /// Lower bound of the global change band. Default: 0.10.
    pub min_threshold: f64,
    /// Upper bound of the global change band. Default: 0.90.
    pub max_threshold: f64,
    /// Number of blocks per side of the grid. Default: 4.
    pub block_grid: u32,
    /// A block change above `block_factor × max_threshold` is a boundary on
    /// its own. Default: 0.8.
    pub block_factor: f64,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            min_threshold: 0.10,
            max_threshold: 0.90,
            block_grid: 4,
            block_factor: 0.8,
        }
    }
}

impl DetectorOptions {
    /// Create detector options with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global change band.
    #[must_use]
    pub fn with_thresholds(mut self, min_threshold: f64, max_threshold: f64) -> Self {
        self.min_threshold = min_threshold;
        self.max_threshold = max_threshold;
        self
    }

    /// Set the number of blocks per grid side. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_block_grid(mut self, blocks: u32) -> Self {
        self.block_grid = blocks.max(1);
        self
    }

    /// Set the block trigger factor.
    #[must_use]
    pub fn with_block_factor(mut self, factor: f64) -> Self {
        self.block_factor = factor;
        self
    }

    /// The block change a single block must exceed to force a boundary.
    pub fn block_trigger(&self) -> f64 {
        self.max_threshold * self.block_factor
    }
}

/// Block-wise pixel-difference scene change detector.
#[derive(Debug, Clone, Default)]
pub struct SceneChangeDetector {
    options: DetectorOptions,
}

impl SceneChangeDetector {
    /// Create a detector with custom tuning.
    pub fn new(options: DetectorOptions) -> Self {
        Self { options }
    }

    /// The tuning this detector was built with.
    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Compare `previous` against `current`.
    ///
    /// Both frames are expected to share dimensions. If they do not, only
    /// the overlapping top-left region is compared.
    pub fn detect(&self, previous: &RgbImage, current: &RgbImage) -> DetectionResult {

        let difference = absolute_difference(&to_luma(previous), &to_luma(current));
        let global_change = mean_change(&difference, 0, 0, difference.width(), difference.height());
        let max_block_change = self.max_block_change(&difference);

        let options = &self.options;
        let in_band =
            options.min_threshold <= global_change && global_change <= options.max_threshold;
        let block_triggered = max_block_change > options.block_trigger();

        DetectionResult {
            is_new_scene: in_band || block_triggered,
            change_magnitude: global_change.max(max_block_change),
        }
    }

    fn max_block_change(&self, difference: &GrayImage) -> f64 {
        let blocks = self.options.block_grid.max(1);
        let block_width = difference.width() / blocks;
        let block_height = difference.height() / blocks;

        let mut max_change: f64 = 0.0;
        for row in 0..blocks {
            for column in 0..blocks {
                let change = mean_change(
                    difference,
                    column * block_width,
                    row * block_height,
                    block_width,
                    block_height,
                );
                max_change = max_change.max(change);
            }
        }
        max_change
    }
}

/// Per-pixel absolute luminance difference over the overlapping region.
fn absolute_difference(previous: &GrayImage, current: &GrayImage) -> GrayImage {
    let width = previous.width().min(current.width());
    let height = previous.height().min(current.height());
    GrayImage::from_fn(width, height, |x, y| {
        let a = previous.get_pixel(x, y)[0];
        let b = current.get_pixel(x, y)[0];
        image::Luma([a.abs_diff(b)])
    })
}

/// Mean difference of a rectangle, normalized to `[0.0, 1.0]`.
///
/// Empty rectangles report no change.
fn mean_change(difference: &GrayImage, x: u32, y: u32, width: u32, height: u32) -> f64 {
    if width == 0 || height == 0 {
        return 0.0;
    }

    let mut total: u64 = 0;
    for row in y..y + height {
        for column in x..x + width {
            total += difference.get_pixel(column, row)[0] as u64;
        }
    }
    let count = width as u64 * height as u64;
    total as f64 / count as f64 / 255.0
}
