use std::{
    collections::HashSet,
    error::Error,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use scenepick::{
    DetectorOptions, ExportOptions, FfmpegLogLevel, KeyframeSelector, ProgressCallback,
    ProgressInfo, ScenePickError, ScoredFrame, SelectionInput, SelectionOptions, VideoSource,
};
use serde_json::{Value, json};

const CLI_AFTER_HELP: &str = "Examples:\n  scenepick select input.mp4 --out key_frames\n  scenepick select a.mp4 b.mp4 --out galleries --max-frames 8 --progress\n  scenepick still thumbnail.jpg --out cover --json\n  scenepick completions zsh > _scenepick";

/// Exit code used when a run finishes without selecting anything.
const EXIT_NO_SCENES: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "scenepick",
    version,
    about = "Pick sharp, visually distinct key frames from videos",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while scanning videos.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, clap::Args)]
struct ExportArgs {
    /// Output directory for the selected frames and their manifest.
    #[arg(long)]
    out: PathBuf,

    /// Width of exported images in pixels (height keeps the aspect ratio).
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = 95)]
    quality: u8,

    /// Print the selected frames as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Select key frames from one or more video files.
    #[command(
        about = "Select key frames from videos",
        after_help = "Examples:\n  scenepick select input.mp4 --out key_frames\n  scenepick select input.mp4 --out key_frames --stride 1 --min-interval 1.0"
    )]
    Select {
        /// Input video paths.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        export: ExportArgs,

        /// Maximum number of frames kept per video.
        #[arg(long, default_value_t = 6)]
        max_frames: usize,

        /// Compare every Nth frame.
        #[arg(long, default_value_t = 2)]
        stride: u64,

        /// Minimum seconds between two selected boundaries.
        #[arg(long, default_value_t = 0.3)]
        min_interval: f64,

        /// Lower bound of the frame-wide change band (0-1).
        #[arg(long, default_value_t = 0.10)]
        min_threshold: f64,

        /// Upper bound of the frame-wide change band (0-1).
        #[arg(long, default_value_t = 0.90)]
        max_threshold: f64,
    },

    /// Use a single still image as the whole result (thumbnail-only mode).
    #[command(about = "Export a still image as the only key frame")]
    Still {
        /// Input image path.
        input: PathBuf,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "Examples:\n  scenepick completions bash > scenepick.bash\n  scenepick completions zsh > _scenepick"
    )]
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Renders pipeline progress on an indicatif bar.
struct BarProgress {
    bar: ProgressBar,
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        self.bar.set_message(format!("{} selected", info.selected));
    }
}

fn init_logging(global: &GlobalOptions) -> Result<(), Box<dyn Error>> {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init()?;

    if let Some(level) = &global.log_level {
        scenepick::set_ffmpeg_log_level(level.parse::<FfmpegLogLevel>()?);
    } else if !global.verbose {
        scenepick::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    }
    Ok(())
}

fn export_options(args: &ExportArgs, global: &GlobalOptions) -> ExportOptions {
    ExportOptions::new()
        .with_target_width(args.width)
        .with_quality(args.quality)
        .with_overwrite(global.overwrite)
}

fn progress_bar(global: &GlobalOptions) -> Result<Option<ProgressBar>, Box<dyn Error>> {
    if !global.progress {
        return Ok(None);
    }
    let bar = ProgressBar::new(0);
    let style =
        ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
    bar.set_style(style.progress_chars("##-"));
    Ok(Some(bar))
}

/// Output directory per input: the shared `out` for a single video, one
/// subdirectory per file stem otherwise. A stem seen before gets a `_N`
/// suffix so no two videos write into the same directory.
fn output_directories(out: &Path, inputs: &[PathBuf]) -> Vec<PathBuf> {
    if inputs.len() <= 1 {
        return vec![out.to_path_buf(); inputs.len()];
    }
    let mut used = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "video".to_string());
            let mut name = stem.clone();
            let mut rank = 1;
            while !used.insert(name.clone()) {
                rank += 1;
                name = format!("{stem}_{rank}");
            }
            out.join(name)
        })
        .collect()
}

fn frames_json(input: &Path, frames: &[ScoredFrame]) -> Value {
    json!({
        "input": input.display().to_string(),
        "frames": frames.iter().map(ScoredFrame::to_json).collect::<Vec<_>>(),
    })
}

fn report(
    input: &Path,
    frames: &[ScoredFrame],
    directory: &Path,
    options: &ExportOptions,
    as_json: bool,
    verbose: bool,
) -> Result<Value, Box<dyn Error>> {
    let written = scenepick::export_frames(frames, directory, options)?;
    if verbose {
        for path in &written {
            eprintln!("saved {}", path.display());
        }
    }
    if !as_json {
        println!(
            "{} {}",
            "success:".green().bold(),
            format!(
                "{} key frame(s) from {} -> {}",
                written.len(),
                input.display(),
                directory.display()
            )
            .green()
        );
        for frame in frames {
            println!(
                "  frame {:>6}  {:>8.2}s  clarity {:>10.2}  change {:.3}",
                frame.index(),
                frame.timestamp(),
                frame.clarity(),
                frame.change_rate()
            );
        }
    }
    Ok(frames_json(input, frames))
}

fn select_sequential(
    inputs: &[PathBuf],
    options: &SelectionOptions,
) -> Vec<(PathBuf, Result<Vec<ScoredFrame>, ScenePickError>)> {
    let selector = KeyframeSelector::new(options.clone());
    inputs
        .iter()
        .map(|input| {
            let outcome = VideoSource::open(input)
                .and_then(|mut source| selector.select(SelectionInput::Video(&mut source)));
            (input.clone(), outcome)
        })
        .collect()
}

#[cfg(feature = "rayon")]
fn select_all(
    inputs: &[PathBuf],
    options: &SelectionOptions,
) -> Vec<(PathBuf, Result<Vec<ScoredFrame>, ScenePickError>)> {
    if inputs.len() > 1 {
        scenepick::select_videos_parallel(inputs, options)
    } else {
        select_sequential(inputs, options)
    }
}

#[cfg(not(feature = "rayon"))]
fn select_all(
    inputs: &[PathBuf],
    options: &SelectionOptions,
) -> Vec<(PathBuf, Result<Vec<ScoredFrame>, ScenePickError>)> {
    select_sequential(inputs, options)
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global)?;

    match cli.command {
        Commands::Select {
            inputs,
            export,
            max_frames,
            stride,
            min_interval,
            min_threshold,
            max_threshold,
        } => {
            if !min_interval.is_finite() || min_interval < 0.0 {
                return Err("--min-interval must be a non-negative number of seconds".into());
            }

            let mut options = SelectionOptions::new()
                .with_max_frames(max_frames)
                .with_stride(stride)
                .with_min_interval(Duration::from_secs_f64(min_interval))
                .with_detector(
                    DetectorOptions::new().with_thresholds(min_threshold, max_threshold),
                );
            options.validate()?;

            let progress_bar = progress_bar(&cli.global)?;
            if let Some(bar) = &progress_bar {
                options = options
                    .with_progress(Arc::new(BarProgress { bar: bar.clone() }))
                    .with_batch_size(25);
            }

            let outcomes = select_all(&inputs, &options);
            if let Some(bar) = progress_bar {
                bar.finish_with_message("done");
            }

            let export_options = export_options(&export, &cli.global);
            let mut payload = Vec::new();
            let mut failures = 0_usize;
            let mut empty = 0_usize;
            let directories = output_directories(&export.out, &inputs);
            for ((input, outcome), directory) in outcomes.into_iter().zip(directories) {
                match outcome {
                    Ok(frames) => match report(
                        &input,
                        &frames,
                        &directory,
                        &export_options,
                        export.json,
                        cli.global.verbose,
                    ) {
                        Ok(value) => payload.push(value),
                        Err(error) => {
                            failures += 1;
                            eprintln!(
                                "{} {}: export failed: {error}",
                                "error:".red().bold(),
                                input.display()
                            );
                        }
                    },
                    Err(error) if error.is_empty_result() => {
                        empty += 1;
                        eprintln!(
                            "{} {}: no scenes detected",
                            "warning:".yellow().bold(),
                            input.display()
                        );
                    }
                    Err(error) => {
                        failures += 1;
                        eprintln!("{} {}: {error}", "error:".red().bold(), input.display());
                    }
                }
            }

            if export.json {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
            if failures > 0 {
                return Err(format!("{failures} of {} video(s) failed", inputs.len()).into());
            }
            if empty == inputs.len() {
                return Err(ScenePickError::NoScenesDetected.into());
            }
        }
        Commands::Still { input, export } => {
            let still = scenepick::load_still(&input)?;
            let frames = KeyframeSelector::default().select(SelectionInput::Still(still))?;
            let value = report(
                &input,
                &frames,
                &export.out,
                &export_options(&export, &cli.global),
                export.json,
                cli.global.verbose,
            )?;
            if export.json {
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "scenepick", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        let no_scenes = error
            .downcast_ref::<ScenePickError>()
            .is_some_and(ScenePickError::is_empty_result);
        if no_scenes {
            eprintln!("{} no scenes detected", "error:".red().bold());
            std::process::exit(EXIT_NO_SCENES);
        }
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::output_directories;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn single_input_writes_into_out_directly() {
        let out = output_directories(Path::new("gallery"), &paths(&["clips/a.mp4"]));
        assert_eq!(out, vec![PathBuf::from("gallery")]);
    }

    #[test]
    fn multiple_inputs_get_their_own_directory() {
        let out = output_directories(Path::new("gallery"), &paths(&["clips/a.mp4", "b.mkv"]));
        let gallery = Path::new("gallery");
        assert_eq!(out, vec![gallery.join("a"), gallery.join("b")]);
    }

    #[test]
    fn repeated_stems_get_distinct_directories() {
        let inputs = paths(&["day1/clip.mp4", "day2/clip.mp4", "clip.mov", "clip_2.mp4"]);
        let out = output_directories(Path::new("gallery"), &inputs);

        let gallery = Path::new("gallery");
        assert_eq!(
            out,
            vec![
                gallery.join("clip"),
                gallery.join("clip_2"),
                gallery.join("clip_3"),
                gallery.join("clip_2_2"),
            ]
        );
    }
}
