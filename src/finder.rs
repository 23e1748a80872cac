//! Windowed search for the sharpest frame near a candidate index.
//!
//! A scene boundary is usually detected on a frame that is mid-transition or
//! motion-blurred. Looking a little before and after it and keeping the
//! sharpest frame gives a better representative.

use image::RgbImage;

use crate::clarity::ClarityScorer;
use crate::source::{CursorGuard, FrameSource};

/// Default search radius when refining a detected boundary.
pub const BOUNDARY_WINDOW_RADIUS: u64 = 30;

/// Default search radius when refining the leading (cover) frame.
pub const COVER_WINDOW_RADIUS: u64 = 15;

/// The sharpest frame found in a window.
#[derive(Debug, Clone)]
pub struct ClearestFrame {
    /// The frame pixels.
    pub image: RgbImage,
    /// Index of the frame in the source.
    pub index: u64,
    /// Its clarity score.
    pub clarity: f64,
}

/// Searches a bounded window of a [`FrameSource`] for the sharpest frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearestFrameFinder;

impl ClearestFrameFinder {
    /// Search `[center - radius, center + radius)` for the sharpest frame.
    ///
    /// The lower bound saturates at zero. Frames that fail to decode are
    /// skipped; reaching the end of the stream (or failing to seek) ends the
    /// search. Ties keep the earliest frame.
    ///
    /// The source's read position is the same after the call as before it.
    /// Returns `None` when no frame in the window could be read, in which
    /// case callers keep their original candidate.
    pub fn find_clearest<S: FrameSource + ?Sized>(
        source: &mut S,
        center: u64,
        radius: u64,
    ) -> Option<ClearestFrame> {
        let start = center.saturating_sub(radius);
        let end = center.saturating_add(radius);

        let mut source = CursorGuard::new(source);
        if !source.seek(start) {
            log::debug!("Window search at {center}: cannot seek to {start}");
            return None;
        }

        let mut best: Option<ClearestFrame> = None;
        while source.position() < end {
            let index = source.position();
            let image = match source.read_next() {
                Ok(Some(image)) => image,
                Ok(None) => break,
                Err(error) => {
                    log::debug!("Window search skipping frame {index}: {error}");
                    if source.position() == index {
                        break;
                    }
                    continue;
                }
            };

            let clarity = ClarityScorer::score(&image);
            if best.as_ref().is_none_or(|current| clarity > current.clarity) {
                best = Some(ClearestFrame {
                    image,
                    index,
                    clarity,
                });
            }
        }

        if let Some(found) = &best {
            log::debug!(
                "Window search at {center} (radius {radius}) picked frame {} (clarity {:.2})",
                found.index,
                found.clarity
            );
        }
        best
    }
}
