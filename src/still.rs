//! Single-image input for thumbnail-only selection.
//!
//! Some inputs only come with a static preview image. These helpers turn
//! such an image into the RGB frame that
//! [`SelectionInput::Still`](crate::SelectionInput::Still) expects.

use std::path::Path;

use image::RgbImage;

use crate::error::ScenePickError;

/// Load a still image from disk as an RGB frame.
///
/// # Errors
///
/// Returns [`ScenePickError::SourceOpen`] if the file cannot be read or
/// decoded, or [`ScenePickError::SourceUnavailable`] if it has no pixels.
pub fn load_still<P: AsRef<Path>>(path: P) -> Result<RgbImage, ScenePickError> {
    let path = path.as_ref();
    log::debug!("Loading still image: {}", path.display());
    let image = image::open(path).map_err(|error| ScenePickError::SourceOpen {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    non_empty(image.to_rgb8())
}

/// Decode a still image from encoded bytes (PNG, JPEG, WebP, ...).
///
/// # Errors
///
/// Returns [`ScenePickError::SourceUnavailable`] if the bytes do not decode
/// to a non-empty image.
pub fn decode_still(bytes: &[u8]) -> Result<RgbImage, ScenePickError> {
    let image = image::load_from_memory(bytes)
        .map_err(|error| ScenePickError::SourceUnavailable(format!("undecodable image: {error}")))?;
    non_empty(image.to_rgb8())
}

fn non_empty(image: RgbImage) -> Result<RgbImage, ScenePickError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ScenePickError::SourceUnavailable(
            "image has no pixels".to_string(),
        ));
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb};

    use super::*;

    #[test]
    fn decodes_png_bytes() {
        let original = RgbImage::from_pixel(4, 3, Rgb([200, 10, 10]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(original.clone())
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();

        assert_eq!(decode_still(bytes.get_ref()).unwrap(), original);
    }

    #[test]
    fn garbage_bytes_are_unavailable() {
        assert!(matches!(
            decode_still(b"definitely not an image"),
            Err(ScenePickError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        assert!(matches!(
            load_still("no/such/thumbnail.jpg"),
            Err(ScenePickError::SourceOpen { .. })
        ));
    }
}
