//! Frame source abstraction.
//!
//! The selection pipeline pulls frames sequentially through [`FrameSource`],
//! while the clearest-frame search needs to jump around the current read
//! position and come back. [`CursorGuard`] ties that save/restore to a scope.
//!
//! Two providers live in the crate: [`MemorySource`] for frames already held
//! in memory (decoded or still encoded), and
//! [`VideoSource`](crate::VideoSource) for local video files decoded with
//! FFmpeg (feature `video`).

use std::ops::{Deref, DerefMut};

use image::RgbImage;

use crate::error::ScenePickError;

/// A seekable, sequential supplier of RGB frames.
///
/// Frame indices start at zero. [`position`](FrameSource::position) is the
/// index of the frame the next [`read_next`](FrameSource::read_next) yields.
pub trait FrameSource {
    /// Read the frame at the current position and advance by one.
    ///
    /// Returns `Ok(None)` at end of stream. An `Err` means that single frame
    /// could not be decoded; the position still advances past it.
    fn read_next(&mut self) -> Result<Option<RgbImage>, ScenePickError>;

    /// Move the read position to `index`.
    ///
    /// Returns `false` if the index cannot be reached (e.g. past the end).
    fn seek(&mut self, index: u64) -> bool;

    /// Index of the frame the next read yields.
    fn position(&self) -> u64;

    /// Frames per second, used to derive timestamps.
    fn frame_rate(&self) -> f64;

    /// Total number of frames, if known up front.
    fn frame_count_hint(&self) -> Option<u64> {
        None
    }
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn read_next(&mut self) -> Result<Option<RgbImage>, ScenePickError> {
        (**self).read_next()
    }

    fn seek(&mut self, index: u64) -> bool {
        (**self).seek(index)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn frame_rate(&self) -> f64 {
        (**self).frame_rate()
    }

    fn frame_count_hint(&self) -> Option<u64> {
        (**self).frame_count_hint()
    }
}

/// Scoped read-position save.
///
/// Captures the source position on creation and seeks back to it when
/// dropped, whichever way the scope is left. Dereferences to the source so
/// reads and seeks go through the guard.
pub struct CursorGuard<'a, S: FrameSource + ?Sized> {
    source: &'a mut S,
    saved_position: u64,
}

impl<'a, S: FrameSource + ?Sized> CursorGuard<'a, S> {
    /// Save the current position of `source`.
    pub fn new(source: &'a mut S) -> Self {
        let saved_position = source.position();
        Self {
            source,
            saved_position,
        }
    }

    /// The position that will be restored on drop.
    pub fn saved_position(&self) -> u64 {
        self.saved_position
    }
}

impl<S: FrameSource + ?Sized> Deref for CursorGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.source
    }
}

impl<S: FrameSource + ?Sized> DerefMut for CursorGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.source
    }
}

impl<S: FrameSource + ?Sized> Drop for CursorGuard<'_, S> {
    fn drop(&mut self) {
        if self.source.position() == self.saved_position {
            return;
        }
        if !self.source.seek(self.saved_position) {
            log::warn!(
                "Failed to restore frame source position to {}",
                self.saved_position
            );
        }
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Decoded(RgbImage),
    Encoded(Vec<u8>),
}

/// Frames held in memory.
///
/// Slots may hold decoded frames or encoded image bytes (PNG, JPEG, ...);
/// encoded slots are decoded on read, and bytes that fail to decode surface
/// as a per-frame [`ScenePickError::FrameDecode`].
///
/// # Example
///
/// ```
/// use image::{Rgb, RgbImage};
/// use scenepick::{FrameSource, MemorySource};
///
/// let frames = vec![RgbImage::from_pixel(8, 8, Rgb([0, 0, 0])); 3];
/// let mut source = MemorySource::new(frames, 25.0);
/// assert!(source.read_next().unwrap().is_some());
/// assert_eq!(source.position(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemorySource {
    slots: Vec<Slot>,
    frames_per_second: f64,
    position: u64,
}

impl MemorySource {
    /// Build a source from decoded frames.
    pub fn new(frames: Vec<RgbImage>, frames_per_second: f64) -> Self {
        Self {
            slots: frames.into_iter().map(Slot::Decoded).collect(),
            frames_per_second,
            position: 0,
        }
    }

    /// Build a source from encoded image bytes, one entry per frame.
    pub fn from_encoded(frames: Vec<Vec<u8>>, frames_per_second: f64) -> Self {
        Self {
            slots: frames.into_iter().map(Slot::Encoded).collect(),
            frames_per_second,
            position: 0,
        }
    }

    /// Append a decoded frame.
    pub fn push(&mut self, frame: RgbImage) {
        self.slots.push(Slot::Decoded(frame));
    }

    /// Append encoded image bytes as a frame.
    pub fn push_encoded(&mut self, bytes: Vec<u8>) {
        self.slots.push(Slot::Encoded(bytes));
    }

    /// Number of frames held.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the source holds no frames.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FrameSource for MemorySource {
    fn read_next(&mut self) -> Result<Option<RgbImage>, ScenePickError> {
        let Some(slot) = self.slots.get(self.position as usize) else {
            return Ok(None);
        };
        let index = self.position;
        self.position += 1;

        match slot {
            Slot::Decoded(frame) => Ok(Some(frame.clone())),
            Slot::Encoded(bytes) => image::load_from_memory(bytes)
                .map(|decoded| Some(decoded.to_rgb8()))
                .map_err(|error| ScenePickError::FrameDecode(format!("frame {index}: {error}"))),
        }
    }

    fn seek(&mut self, index: u64) -> bool {
        if index > self.slots.len() as u64 {
            return false;
        }
        self.position = index;
        true
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn frame_rate(&self) -> f64 {
        self.frames_per_second
    }

    fn frame_count_hint(&self) -> Option<u64> {
        Some(self.slots.len() as u64)
    }
}
