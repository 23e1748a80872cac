//! Progress reporting for key-frame selection.
//!
//! [`ProgressCallback`] receives [`ProgressInfo`] snapshots while the
//! pipeline walks a video. Callbacks only observe: the pipeline has no
//! cancellation points, its work is bounded by the video's frame count.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use scenepick::{ProgressCallback, ProgressInfo, SelectionOptions};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{pct:.1}% ({} selected)", info.selected);
//!         }
//!     }
//! }
//!
//! let options = SelectionOptions::new()
//!     .with_progress(Arc::new(PrintProgress))
//!     .with_batch_size(50);
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The stage of work a progress report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Walking the video and detecting scene boundaries.
    SceneDetection,
    /// Encoding selected frames to disk.
    Export,
}

/// A snapshot of selection progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many frames have been read so far.
    pub current: u64,
    /// Total frames expected, if the source knows it.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Index of the frame just read.
    pub current_frame: Option<u64>,
    /// Number of key frames selected so far (before the capacity cap).
    pub selected: usize,
}

/// Trait for receiving progress updates.
///
/// Implementations must be [`Send`] and [`Sync`] so the same callback can be
/// shared by pipelines running on several threads.
pub trait ProgressCallback: Send + Sync {
    /// Called every `batch_size` frames and once at the end.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Default when nothing is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing and emits callbacks in batches.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one frame and fire the callback if the batch is full.
    pub(crate) fn advance(&mut self, frame_index: u64, selected: usize) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(Some(frame_index), selected);
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&mut self, selected: usize) {
        self.report(None, selected);
    }

    fn report(&self, frame_index: Option<u64>, selected: usize) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| ((self.current as f32 / t as f32) * 100.0).min(100.0));

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_frame: frame_index,
            selected,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        reports: Mutex<Vec<ProgressInfo>>,
    }

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.reports.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn reports_every_batch_and_on_finish() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker =
            ProgressTracker::new(recorder.clone(), OperationType::SceneDetection, Some(10), 4);
        for index in 0..10 {
            tracker.advance(index, 0);
        }
        tracker.finish(2);

        let reports = recorder.reports.lock().unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].current, 4);
        assert_eq!(reports[1].current_frame, Some(7));
        assert_eq!(reports[2].percentage, Some(100.0));
        assert_eq!(reports[2].selected, 2);
    }
}
