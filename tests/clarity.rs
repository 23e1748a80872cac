//! Clarity scoring integration tests.

use image::{Rgb, RgbImage, imageops};
use scenepick::ClarityScorer;

fn checkerboard(size: u32, cell: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgb([230, 230, 230])
        } else {
            Rgb([20, 20, 20])
        }
    })
}

#[test]
fn flat_frame_scores_zero() {
    let frame = RgbImage::from_pixel(64, 48, Rgb([10, 200, 90]));
    assert_eq!(ClarityScorer::score(&frame), 0.0);
}

#[test]
fn score_is_deterministic() {
    let frame = checkerboard(64, 4);
    let first = ClarityScorer::score(&frame);
    for _ in 0..3 {
        assert_eq!(ClarityScorer::score(&frame), first);
    }
}

#[test]
fn sharp_frame_beats_its_blurred_copy() {
    let sharp = checkerboard(64, 4);
    let blurred = imageops::blur(&sharp, 2.5);

    let sharp_score = ClarityScorer::score(&sharp);
    let blurred_score = ClarityScorer::score(&blurred);
    assert!(sharp_score > 0.0);
    assert!(
        sharp_score > blurred_score,
        "sharp {sharp_score} should exceed blurred {blurred_score}"
    );
}

#[test]
fn finer_detail_scores_higher() {
    let fine = ClarityScorer::score(&checkerboard(64, 2));
    let coarse = ClarityScorer::score(&checkerboard(64, 16));
    assert!(fine > coarse);
}

#[test]
fn single_pixel_and_empty_frames() {
    assert_eq!(ClarityScorer::score(&RgbImage::new(0, 0)), 0.0);
    assert_eq!(
        ClarityScorer::score(&RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]))),
        0.0
    );
}

#[test]
fn score_is_never_negative() {
    let noise = RgbImage::from_fn(32, 32, |x, y| {
        let v = ((x * 97 + y * 61 + x * y * 13) % 251) as u8;
        Rgb([v, v / 2, 255 - v])
    });
    assert!(ClarityScorer::score(&noise) >= 0.0);
}
