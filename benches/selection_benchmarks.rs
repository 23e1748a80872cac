//! Benchmarks for scoring, detection, and the full selection pipeline.
//!
//! Run with: cargo bench
//!
//! All inputs are synthetic, so no fixture files are needed.

use std::{hint::black_box, time::Duration};

use criterion::Criterion;
use image::{Rgb, RgbImage};
use scenepick::{
    ClarityScorer, ClearestFrameFinder, KeyframeSelector, MemorySource, SceneChangeDetector,
    SelectionInput, SelectionOptions,
};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;

fn patterned(seed: u32) -> RgbImage {
    RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        let v = ((x * 7 + y * 13 + seed * 41) % 256) as u8;
        Rgb([v, v.wrapping_add((seed as u8).wrapping_mul(3)), 255 - v])
    })
}

/// `scenes` scenes of `frames_per_scene` identical frames each.
fn scene_video(scenes: u32, frames_per_scene: usize) -> Vec<RgbImage> {
    (0..scenes)
        .flat_map(|scene| std::iter::repeat_n(patterned(scene * 11), frames_per_scene))
        .collect()
}

fn benchmark_clarity(criterion: &mut Criterion) {
    let frame = patterned(1);

    criterion.bench_function("clarity score (640x360)", |bencher| {
        bencher.iter(|| ClarityScorer::score(black_box(&frame)));
    });
}

fn benchmark_detection(criterion: &mut Criterion) {
    let detector = SceneChangeDetector::default();
    let previous = patterned(1);
    let current = patterned(2);

    criterion.bench_function("scene change detection (640x360)", |bencher| {
        bencher.iter(|| detector.detect(black_box(&previous), black_box(&current)));
    });
}

fn benchmark_window_search(criterion: &mut Criterion) {
    let frames = scene_video(2, 60);

    criterion.bench_function("clearest frame, radius 30", |bencher| {
        bencher.iter(|| {
            let mut source = MemorySource::new(frames.clone(), 30.0);
            ClearestFrameFinder::find_clearest(&mut source, 60, 30)
        });
    });
}

fn benchmark_pipeline(criterion: &mut Criterion) {
    let frames = scene_video(8, 30);
    let selector = KeyframeSelector::new(SelectionOptions::new());

    criterion.bench_function("select key frames (240 frames, 8 scenes)", |bencher| {
        bencher.iter(|| {
            let mut source = MemorySource::new(frames.clone(), 30.0);
            selector
                .select(SelectionInput::Video(&mut source))
                .unwrap()
        });
    });

    let stride_one = KeyframeSelector::new(SelectionOptions::new().with_stride(1));
    criterion.bench_function("select key frames, stride 1", |bencher| {
        bencher.iter(|| {
            let mut source = MemorySource::new(frames.clone(), 30.0);
            stride_one
                .select(SelectionInput::Video(&mut source))
                .unwrap()
        });
    });
}

criterion::criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(20)
        .measurement_time(Duration::from_secs(5));
    targets =
        benchmark_clarity,
        benchmark_detection,
        benchmark_window_search,
        benchmark_pipeline,
}

criterion::criterion_main!(benches);
