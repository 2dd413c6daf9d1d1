//! Runtime configuration settings

use super::cli::{RunArgs, ScheduleArgs};
use crate::error::{MinusOneError, Result};
use crate::pitch::MAX_SEMITONES;
use crate::types::{PitchSchedule, StemCount};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Where the song comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

/// Runtime settings for the pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Song to process
    pub source: Source,
    /// Base directory for stem directories
    pub output_dir: PathBuf,
    /// Directory downloads land in
    pub download_dir: PathBuf,
    /// Separation preset
    pub stem_count: StemCount,
    /// Write pitch variants of the backing track
    pub pitch_enabled: bool,
    /// Semitone offsets for pitch variants
    pub pitch_schedule: PitchSchedule,
    /// Separate again even if stems exist
    pub force: bool,
    /// Show progress bars
    pub show_progress: bool,
    /// Dry run mode - show planned work without doing it
    pub dry_run: bool,
    /// Write minusone.json next to the stems
    pub write_manifest: bool,
}

impl Settings {
    /// Create settings from `run` arguments
    pub fn from_run_args(args: &RunArgs, quiet: bool) -> Result<Self> {
        let defaults = Self::default();

        let source = match (&args.url, &args.input) {
            (Some(url), None) => Source::Url(url.clone()),
            (None, Some(path)) => Source::File(path.clone()),
            _ => {
                return Err(MinusOneError::ConfigError(
                    "exactly one of --url or --input is required".to_string(),
                ))
            }
        };

        let stem_count = args
            .stems
            .parse::<u8>()
            .ok()
            .and_then(StemCount::from_count)
            .ok_or_else(|| {
                MinusOneError::ConfigError(format!(
                    "unsupported stem count '{}', expected 2, 4 or 5",
                    args.stems
                ))
            })?;

        Ok(Self {
            source,
            output_dir: args.output.clone().unwrap_or(defaults.output_dir),
            download_dir: args.downloads.clone().unwrap_or(defaults.download_dir),
            stem_count,
            pitch_enabled: args.pitch,
            pitch_schedule: schedule_from_args(&args.schedule)?,
            force: args.force,
            show_progress: !quiet,
            dry_run: args.dry_run,
            write_manifest: !args.no_manifest,
        })
    }
}

/// Build and validate a pitch schedule
pub fn schedule_from_args(args: &ScheduleArgs) -> Result<PitchSchedule> {
    let schedule = PitchSchedule::new(args.pitch_start, args.pitch_stop, args.pitch_step);
    validate_schedule(&schedule)?;
    Ok(schedule)
}

/// Reject schedules that produce nothing or shift too far
pub fn validate_schedule(schedule: &PitchSchedule) -> Result<()> {
    if schedule.step == 0 {
        return Err(MinusOneError::ConfigError(
            "--pitch-step must not be zero".to_string(),
        ));
    }
    // Bounded endpoints keep the offset list short
    if !(-MAX_SEMITONES..=MAX_SEMITONES).contains(&schedule.start) {
        return Err(MinusOneError::ConfigError(format!(
            "--pitch-start {} is outside ±{} semitones",
            schedule.start, MAX_SEMITONES
        )));
    }
    if !(-MAX_SEMITONES - 1..=MAX_SEMITONES + 1).contains(&schedule.stop) {
        return Err(MinusOneError::ConfigError(format!(
            "--pitch-stop {} is outside ±{} semitones",
            schedule.stop,
            MAX_SEMITONES + 1
        )));
    }
    if schedule.offsets().is_empty() {
        return Err(MinusOneError::ConfigError(format!(
            "pitch schedule {}..{} step {} contains no offsets",
            schedule.start, schedule.stop, schedule.step
        )));
    }
    Ok(())
}

/// Per-user data directory, or the working directory if there is none
fn data_root() -> PathBuf {
    ProjectDirs::from("com", "minusone", "minusone")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Default for Settings {
    fn default() -> Self {
        let root = data_root();
        Self {
            source: Source::File(PathBuf::new()),
            output_dir: root.join("audio_output"),
            download_dir: root.join("audio_from_yt"),
            stem_count: StemCount::default(),
            pitch_enabled: false,
            pitch_schedule: PitchSchedule::default(),
            force: false,
            show_progress: true,
            dry_run: false,
            write_manifest: true,
        }
    }
}
