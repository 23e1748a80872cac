//! Writing selected frames to disk.
//!
//! Each frame is scaled to a fixed width (aspect ratio preserved) and encoded
//! as JPEG. A `frames.json` manifest next to the images records the numeric
//! fields of every frame so a gallery or archiver can pick them up.
//!
//! # Example
//!
//! ```no_run
//! use scenepick::{ExportOptions, KeyframeSelector, ScenePickError, SelectionInput, load_still};
//!
//! let still = load_still("thumbnail.jpg")?;
//! let frames = KeyframeSelector::default().select(SelectionInput::Still(still))?;
//! let written = scenepick::export_frames(&frames, "out", &ExportOptions::new())?;
//! println!("wrote {} files", written.len());
//! # Ok::<(), ScenePickError>(())
//! ```

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, codecs::jpeg::JpegEncoder, imageops::FilterType};
use serde_json::json;

use crate::error::ScenePickError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};
use crate::selection::ScoredFrame;

/// Name of the manifest written alongside exported images.
pub const MANIFEST_FILE_NAME: &str = "frames.json";

/// Settings for exported images.
#[derive(Debug, Clone)]
#[must_use]
pub struct ExportOptions {
    /// Output width in pixels; height follows the aspect ratio. Default: 1280.
    pub target_width: u32,
    /// JPEG quality, 1–100. Default: 95.
    pub quality: u8,
    /// Replace files that already exist. Default: `false`.
    pub overwrite: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            target_width: 1280,
            quality: 95,
            overwrite: false,
        }
    }
}

impl ExportOptions {
    /// Create export options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output width. Clamped to at least 1.
    pub fn with_target_width(mut self, width: u32) -> Self {
        self.target_width = width.max(1);
        self
    }

    /// Set the JPEG quality. Clamped to 1–100.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Allow replacing existing files.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Output size for a frame scaled to `target_width`.
pub(crate) fn scaled_dimensions(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    if width == 0 {
        return (target_width, height.max(1));
    }
    let ratio = target_width as f64 / width as f64;
    let scaled_height = (height as f64 * ratio).round() as u32;
    (target_width, scaled_height.max(1))
}

/// Scale a frame to the configured width and encode it as JPEG.
///
/// # Errors
///
/// Returns [`ScenePickError::Image`] if encoding fails.
pub fn encode_jpeg(
    frame: &ScoredFrame,
    options: &ExportOptions,
) -> Result<Vec<u8>, ScenePickError> {
    let image = frame.image();
    let (width, height) = scaled_dimensions(image.width(), image.height(), options.target_width);
    let resized = if (width, height) == image.dimensions() {
        DynamicImage::ImageRgb8(image.clone())
    } else {
        DynamicImage::ImageRgb8(image.clone()).resize_exact(width, height, FilterType::Triangle)
    };

    let mut bytes = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut bytes, options.quality.clamp(1, 100));
    resized.to_rgb8().write_with_encoder(encoder)?;
    Ok(bytes.into_inner())
}

/// File name used for the frame at `rank` (its position in the result).
pub fn frame_file_name(rank: usize, frame: &ScoredFrame) -> String {
    format!("scene_{rank:02}_frame_{:06}.jpg", frame.index())
}

/// Write every frame as a JPEG into `directory`, plus a manifest.
///
/// The directory is created if needed. Returns the paths of the written
/// images in result order (the manifest path is not included).
///
/// # Errors
///
/// Returns [`ScenePickError::OutputExists`] if a target file exists and
/// `overwrite` is off, or I/O / encoding errors.
pub fn export_frames<P: AsRef<Path>>(
    frames: &[ScoredFrame],
    directory: P,
    options: &ExportOptions,
) -> Result<Vec<PathBuf>, ScenePickError> {
    export_frames_with_progress(frames, directory, options, Arc::new(NoOpProgress))
}

/// Like [`export_frames`], reporting one progress step per written image.
pub fn export_frames_with_progress<P: AsRef<Path>>(
    frames: &[ScoredFrame],
    directory: P,
    options: &ExportOptions,
    callback: Arc<dyn ProgressCallback>,
) -> Result<Vec<PathBuf>, ScenePickError> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory)?;
    log::debug!(
        "Exporting {} frame(s) to {} (width={}, quality={})",
        frames.len(),
        directory.display(),
        options.target_width,
        options.quality
    );

    let manifest_path = directory.join(MANIFEST_FILE_NAME);
    ensure_writable(&manifest_path, options.overwrite)?;

    let mut progress = ProgressTracker::new(
        callback,
        OperationType::Export,
        Some(frames.len() as u64),
        1,
    );

    let mut written = Vec::with_capacity(frames.len());
    let mut entries = Vec::with_capacity(frames.len());
    for (rank, frame) in frames.iter().enumerate() {
        let file_name = frame_file_name(rank, frame);
        let path = directory.join(&file_name);
        ensure_writable(&path, options.overwrite)?;

        fs::write(&path, encode_jpeg(frame, options)?)?;
        log::debug!("Wrote frame {} -> {}", frame.index(), path.display());

        let mut entry = frame.to_json();
        entry["file"] = json!(file_name);
        entries.push(entry);
        written.push(path);
        progress.advance(frame.index(), rank + 1);
    }
    progress.finish(frames.len());

    let manifest = json!({ "frames": entries });
    let manifest_bytes = serde_json::to_vec_pretty(&manifest).map_err(std::io::Error::from)?;
    fs::write(&manifest_path, manifest_bytes)?;
    Ok(written)
}

fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), ScenePickError> {
    if path.exists() && !overwrite {
        return Err(ScenePickError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_dimensions_preserve_aspect_ratio() {
        assert_eq!(scaled_dimensions(1920, 1080, 1280), (1280, 720));
        assert_eq!(scaled_dimensions(640, 480, 1280), (1280, 960));
        assert_eq!(scaled_dimensions(4000, 1, 1280), (1280, 1));
    }
}
