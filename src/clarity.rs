//! Frame sharpness scoring.
//!
//! The score is the variance of the Laplacian of the frame's luminance.
//! Blurred frames carry little high-frequency energy, so their Laplacian
//! response is flat and its variance is low.
//!
//! # Example
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use scenepick::ClarityScorer;
//!
//! let flat = RgbImage::from_pixel(16, 16, Rgb([90, 90, 90]));
//! assert_eq!(ClarityScorer::score(&flat), 0.0);
//! ```

use image::{GrayImage, RgbImage};

use crate::conversion::to_luma;

/// Stateless Laplacian-variance sharpness scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClarityScorer;

impl ClarityScorer {
    /// Score the sharpness of an RGB frame. Higher is sharper.
    ///
    /// The result is non-negative and unbounded. Zero-sized frames score
    /// `0.0`.
    pub fn score(frame: &RgbImage) -> f64 {
        laplacian_variance(&to_luma(frame))
    }
}

/// Population variance of the 4-neighbour Laplacian response.
///
/// Borders are handled with reflect-101 (`dcb|abcd|cba`), so a constant image
/// has a response of exactly zero everywhere.
pub(crate) fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let width = width as i64;
    let height = height as i64;
    let pixels = gray.as_raw();
    let at = |x: i64, y: i64| -> f64 {
        let x = reflect_101(x, width);
        let y = reflect_101(y, height);
        pixels[(y * width + x) as usize] as f64
    };

    let mut sum = 0.0;
    let mut sum_squares = 0.0;
    for y in 0..height {
        for x in 0..width {
            let response =
                at(x, y - 1) + at(x - 1, y) + at(x + 1, y) + at(x, y + 1) - 4.0 * at(x, y);
            sum += response;
            sum_squares += response * response;
        }
    }

    let count = (width * height) as f64;
    let mean = sum / count;
    (sum_squares / count - mean * mean).max(0.0)
}

fn reflect_101(index: i64, len: i64) -> i64 {
    if len == 1 {
        return 0;
    }
    let mut index = index;
    while index < 0 || index >= len {
        if index < 0 {
            index = -index;
        }
        if index >= len {
            index = 2 * (len - 1) - index;
        }
    }
    index
}
