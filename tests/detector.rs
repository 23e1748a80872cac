//! Scene change detector integration tests.

use image::{Rgb, RgbImage};
use scenepick::{DetectorOptions, SceneChangeDetector};

fn gray(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

/// A black frame with one bright rectangle.
fn with_patch(width: u32, height: u32, patch: (u32, u32, u32, u32)) -> RgbImage {
    let (px, py, pw, ph) = patch;
    RgbImage::from_fn(width, height, |x, y| {
        if (px..px + pw).contains(&x) && (py..py + ph).contains(&y) {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

// ── Global band ────────────────────────────────────────────────────

#[test]
fn identical_frames_are_not_a_new_scene() {
    let detector = SceneChangeDetector::default();
    let frame = gray(32, 24, 77);

    let result = detector.detect(&frame, &frame);
    assert!(!result.is_new_scene);
    assert_eq!(result.change_magnitude, 0.0);
}

#[test]
fn moderate_global_change_is_a_new_scene() {
    let detector = SceneChangeDetector::default();

    let result = detector.detect(&gray(32, 32, 10), &gray(32, 32, 120));
    assert!(result.is_new_scene);
    assert!((result.change_magnitude - 110.0 / 255.0).abs() < 1e-9);
}

#[test]
fn small_uniform_change_is_ignored() {
    let detector = SceneChangeDetector::default();

    let result = detector.detect(&gray(32, 32, 0), &gray(32, 32, 20));
    assert!(!result.is_new_scene);
    assert!((result.change_magnitude - 20.0 / 255.0).abs() < 1e-9);
}

#[test]
fn full_flash_is_caught_by_the_block_trigger() {
    // Global change 1.0 is above the band, but every block changes fully.
    let detector = SceneChangeDetector::default();

    let result = detector.detect(&gray(16, 16, 0), &gray(16, 16, 255));
    assert!(result.is_new_scene);
    assert_eq!(result.change_magnitude, 1.0);
}

#[test]
fn raised_lower_threshold_ignores_moderate_change() {
    let detector =
        SceneChangeDetector::new(DetectorOptions::new().with_thresholds(0.5, 0.9));

    let result = detector.detect(&gray(32, 32, 0), &gray(32, 32, 100));
    assert!(!result.is_new_scene);
    assert!((result.change_magnitude - 100.0 / 255.0).abs() < 1e-9);
}

// ── Block grid ─────────────────────────────────────────────────────

#[test]
fn localized_change_triggers_through_one_block() {
    // 40x40 frame, 4x4 grid of 10x10 blocks; only the top-left block changes.
    let detector = SceneChangeDetector::default();
    let before = gray(40, 40, 0);
    let after = with_patch(40, 40, (0, 0, 10, 10));

    let result = detector.detect(&before, &after);
    assert!(result.is_new_scene);
    assert_eq!(result.change_magnitude, 1.0);
}

#[test]
fn block_just_past_the_trigger_is_a_new_scene() {
    // A 9x9 patch inside one 10x10 cell: 81% of the block changes while only
    // about 5% of the frame does.
    let detector = SceneChangeDetector::default();
    let trigger = detector.options().block_trigger();
    let before = gray(40, 40, 0);
    let after = with_patch(40, 40, (21, 11, 9, 9));

    let result = detector.detect(&before, &after);
    assert!(81.0 / 1600.0 < 0.10);
    assert!(0.81 > trigger);
    assert!(result.is_new_scene);
    assert!((result.change_magnitude - 0.81).abs() < 1e-9);
}

#[test]
fn block_just_under_the_trigger_is_ignored() {
    let detector = SceneChangeDetector::default();
    let before = gray(40, 40, 0);
    let after = with_patch(40, 40, (22, 12, 8, 8));

    let result = detector.detect(&before, &after);
    assert!(0.64 < detector.options().block_trigger());
    assert!(!result.is_new_scene);
    assert!((result.change_magnitude - 0.64).abs() < 1e-9);
}

#[test]
fn localized_change_is_missed_with_a_single_block() {
    let detector = SceneChangeDetector::new(DetectorOptions::new().with_block_grid(1));
    let before = gray(40, 40, 0);
    let after = with_patch(40, 40, (0, 0, 10, 10));

    let result = detector.detect(&before, &after);
    assert!(!result.is_new_scene);
    assert!((result.change_magnitude - 0.0625).abs() < 1e-9);
}

#[test]
fn trailing_pixels_only_count_globally() {
    // 42 pixels with a 4x4 grid gives 10-pixel blocks; columns 40 and 41 sit
    // outside every block.
    let detector = SceneChangeDetector::default();
    let before = gray(42, 42, 0);
    let after = with_patch(42, 42, (40, 0, 2, 42));

    let result = detector.detect(&before, &after);
    assert!(!result.is_new_scene);
    assert!((result.change_magnitude - 2.0 / 42.0).abs() < 1e-9);
}

#[test]
fn tiny_frames_fall_back_to_global_change() {
    // 3x3 frames give zero-sized blocks, which report no change.
    let detector = SceneChangeDetector::default();

    let result = detector.detect(&gray(3, 3, 0), &gray(3, 3, 100));
    assert!(result.is_new_scene);
    assert!((result.change_magnitude - 100.0 / 255.0).abs() < 1e-9);
}

// ── Magnitude range ────────────────────────────────────────────────

#[test]
fn magnitude_stays_in_unit_range() {
    let detector = SceneChangeDetector::default();
    let patterns: Vec<RgbImage> = (0..6u32)
        .map(|seed| {
            RgbImage::from_fn(24, 24, |x, y| {
                let v = ((x * 31 + y * 17 + seed * 53) % 256) as u8;
                Rgb([v, v.wrapping_mul(3), 255 - v])
            })
        })
        .collect();

    for a in &patterns {
        for b in &patterns {
            let magnitude = detector.detect(a, b).change_magnitude;
            assert!((0.0..=1.0).contains(&magnitude), "magnitude {magnitude}");
        }
    }
}

#[test]
fn magnitude_is_symmetric() {
    let detector = SceneChangeDetector::default();
    let a = with_patch(40, 40, (5, 5, 20, 12));
    let b = gray(40, 40, 90);

    assert_eq!(detector.detect(&a, &b), detector.detect(&b, &a));
}
