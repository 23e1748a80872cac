//! FFmpeg-backed frame source integration tests.
//!
//! Tests that need media skip themselves when
//! `tests/fixtures/sample_video.mp4` is missing. Generate one with e.g.:
//!
//! ```text
//! ffmpeg -f lavfi -i testsrc=duration=5:size=320x240:rate=30 -pix_fmt yuv420p \
//!     tests/fixtures/sample_video.mp4
//! ```

#![cfg(feature = "video")]

use std::path::Path;

use scenepick::{
    ClearestFrameFinder, FfmpegLogLevel, FrameSource, KeyframeSelector, ScenePickError,
    SelectionInput, SelectionOptions, VideoSource, set_ffmpeg_log_level,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn open_fixture() -> Option<VideoSource> {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return None;
    }
    set_ffmpeg_log_level(FfmpegLogLevel::Error);
    Some(VideoSource::open(path).expect("Failed to open fixture"))
}

// ── Opening ────────────────────────────────────────────────────────

#[test]
fn missing_file_is_a_source_open_error() {
    let result = VideoSource::open("tests/fixtures/does_not_exist.mp4");
    match result {
        Err(ScenePickError::SourceOpen { path, .. }) => {
            assert!(path.ends_with("does_not_exist.mp4"));
        }
        other => panic!("Expected SourceOpen, got: {other:?}"),
    }
}

#[test]
fn fixture_reports_stream_properties() {
    let Some(source) = open_fixture() else {
        return;
    };

    assert!(source.frame_rate() > 0.0);
    assert!(source.width() > 0);
    assert!(source.height() > 0);
    assert_eq!(source.position(), 0);
}

// ── Reading and seeking ────────────────────────────────────────────

#[test]
fn sequential_reads_advance_position() {
    let Some(mut source) = open_fixture() else {
        return;
    };

    for expected in 0..5 {
        assert_eq!(source.position(), expected);
        let frame = source.read_next().unwrap().expect("frame");
        assert_eq!(frame.dimensions(), (source.width(), source.height()));
    }
    assert_eq!(source.position(), 5);
}

#[test]
fn seek_returns_the_same_frame_as_sequential_reads() {
    let Some(mut source) = open_fixture() else {
        return;
    };

    let mut sequential = Vec::new();
    for _ in 0..12 {
        sequential.push(source.read_next().unwrap().expect("frame"));
    }

    assert!(source.seek(3));
    assert_eq!(source.position(), 3);
    let frame = source.read_next().unwrap().expect("frame");
    assert_eq!(frame, sequential[3]);

    assert!(source.seek(10));
    let frame = source.read_next().unwrap().expect("frame");
    assert_eq!(frame, sequential[10]);
}

#[test]
fn window_search_restores_the_read_position() {
    let Some(mut source) = open_fixture() else {
        return;
    };

    for _ in 0..20 {
        source.read_next().unwrap();
    }
    let found = ClearestFrameFinder::find_clearest(&mut source, 20, 8);
    assert!(found.is_some());
    assert_eq!(source.position(), 20);
}

#[test]
fn reading_to_the_end_returns_none() {
    let Some(mut source) = open_fixture() else {
        return;
    };

    let mut count = 0_u64;
    while let Some(_frame) = source.read_next().unwrap() {
        count += 1;
    }
    assert!(count > 0);
    assert!(source.read_next().unwrap().is_none());
}

// ── Pipeline ───────────────────────────────────────────────────────

#[test]
fn pipeline_selects_from_fixture() {
    let Some(mut source) = open_fixture() else {
        return;
    };
    let fps = source.frame_rate();

    let selected = KeyframeSelector::new(SelectionOptions::new())
        .select(SelectionInput::Video(&mut source))
        .unwrap();

    assert!(!selected.is_empty());
    assert!(selected.len() <= 6);
    assert_eq!(selected[0].index(), 0);
    for pair in selected.windows(2) {
        assert!(pair[0].timestamp() <= pair[1].timestamp());
    }
    for frame in &selected {
        assert!((frame.timestamp() - frame.index() as f64 / fps).abs() < 1e-9);
    }
}
