//! CLI argument parsing and configuration

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// minusone - practice tracks from any song
///
/// Downloads a song, separates it into stems, writes one mix per stem with
/// that stem left out, and optionally pitch-shifts the backing track.
#[derive(Parser, Debug)]
#[command(name = "minusone")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only, no progress bars)
    #[arg(short, long, default_value = "false", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download, separate, combine and optionally pitch-shift a song
    Run(RunArgs),
    /// Write leave-one-out mixes for an existing stem directory
    ///
    /// Mixes are always written as 16-bit WAV (`without_<stem>.wav`),
    /// whatever format the stems are in.
    Combine(CombineArgs),
    /// Write pitch variants of a file, or of a stem directory's backing track
    ///
    /// Variants are always written as 16-bit WAV (`<name>__<offset>.wav`),
    /// so `song.mp3` gives `song__-5.wav`.
    Pitch(PitchArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Video URL to take the audio from
    #[arg(long, value_name = "URL", conflicts_with = "input", required_unless_present = "input")]
    pub url: Option<String>,

    /// Local audio file to use instead of downloading
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Base directory for stem directories
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Directory downloaded audio is stored in
    #[arg(long, value_name = "DIR")]
    pub downloads: Option<PathBuf>,

    /// Number of stems to separate into
    #[arg(short = 'n', long, default_value = "2")]
    #[arg(value_parser = ["2", "4", "5"])]
    pub stems: String,

    /// Also write pitch variants of the backing track
    #[arg(long, default_value = "false")]
    pub pitch: bool,

    #[command(flatten)]
    pub schedule: ScheduleArgs,

    /// Separate again even if the stem directory already has stems
    #[arg(long, default_value = "false")]
    pub force: bool,

    /// Show what would be done without doing it
    #[arg(long, default_value = "false")]
    pub dry_run: bool,

    /// Skip writing the minusone.json manifest
    #[arg(long, default_value = "false")]
    pub no_manifest: bool,
}

#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Directory holding one song's stems
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// List the mixes that would be written
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct PitchArgs {
    /// Audio file, or a stem directory to pick the backing track from
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub schedule: ScheduleArgs,

    /// List the variants that would be written
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

/// Half-open semitone range `start..stop` by `step`
#[derive(Args, Debug, Clone, Copy)]
pub struct ScheduleArgs {
    /// First semitone offset
    #[arg(long, default_value_t = -5, allow_negative_numbers = true)]
    pub pitch_start: i32,

    /// Offset to stop before
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    pub pitch_stop: i32,

    /// Step between offsets
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    pub pitch_step: i32,
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
