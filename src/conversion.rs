//! Internal pixel conversions shared by the scorer and the detector.

use image::{GrayImage, RgbImage};

// BT.601 luma weights in 14-bit fixed point (0.299, 0.587, 0.114).
const RED_WEIGHT: u32 = 4899;
const GREEN_WEIGHT: u32 = 9617;
const BLUE_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;
const ROUNDING: u32 = 1 << (SHIFT - 1);

/// Convert an RGB frame to single-channel luminance.
///
/// Uses BT.601 weights rather than [`image::DynamicImage::to_luma8`]
/// (which applies Rec.709), so scores line up with the usual
/// `BGR2GRAY` conversion found in computer-vision tooling.
pub(crate) fn to_luma(frame: &RgbImage) -> GrayImage {
    let (width, height) = frame.dimensions();
    let luma: Vec<u8> = frame
        .as_raw()
        .chunks_exact(3)
        .map(|pixel| {
            let weighted = pixel[0] as u32 * RED_WEIGHT
                + pixel[1] as u32 * GREEN_WEIGHT
                + pixel[2] as u32 * BLUE_WEIGHT;
            ((weighted + ROUNDING) >> SHIFT) as u8
        })
        .collect();

    // Length always matches width * height for a well-formed RgbImage.
    GrayImage::from_raw(width, height, luma).unwrap_or_else(|| GrayImage::new(width, height))
}
