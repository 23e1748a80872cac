//! Selecting key frames from several videos at once.
//!
//! Each rayon worker opens its own [`VideoSource`] and runs an independent
//! pipeline, so nothing mutable is shared between videos.
//!
//! This module is available when both the `rayon` and `video` features are
//! enabled.

use std::path::{Path, PathBuf};

use ::rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::configuration::SelectionOptions;
use crate::error::ScenePickError;
use crate::selection::{KeyframeSelector, ScoredFrame, SelectionInput};
use crate::video::VideoSource;

/// Per-video outcome of [`select_videos_parallel`].
pub type VideoSelection = (PathBuf, Result<Vec<ScoredFrame>, ScenePickError>);

/// Run the selection pipeline on every path in parallel.
///
/// Results come back in input order; one failing video does not affect the
/// others.
///
/// # Example
///
/// ```no_run
/// use scenepick::{SelectionOptions, select_videos_parallel};
///
/// let results = select_videos_parallel(&["a.mp4", "b.mp4"], &SelectionOptions::new());
/// for (path, outcome) in results {
///     match outcome {
///         Ok(frames) => println!("{}: {} frames", path.display(), frames.len()),
///         Err(error) => eprintln!("{}: {error}", path.display()),
///     }
/// }
/// ```
pub fn select_videos_parallel<P: AsRef<Path> + Sync>(
    paths: &[P],
    options: &SelectionOptions,
) -> Vec<VideoSelection> {
    let selector = KeyframeSelector::new(options.clone());
    log::debug!("Selecting key frames from {} videos in parallel", paths.len());

    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let outcome = select_one(&selector, path);
            if let Err(error) = &outcome {
                log::warn!("{}: {error}", path.display());
            }
            (path.to_path_buf(), outcome)
        })
        .collect()
}

fn select_one(
    selector: &KeyframeSelector,
    path: &Path,
) -> Result<Vec<ScoredFrame>, ScenePickError> {
    let mut source = VideoSource::open(path)?;
    selector.select(SelectionInput::Video(&mut source))
}
