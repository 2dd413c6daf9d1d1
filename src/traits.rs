//! Backend trait abstractions
//!
//! These traits define the interface for swappable backends. The pipeline
//! only talks to these, so tests can drive it with in-process fakes instead
//! of real downloads and separation runs.

use crate::error::Result;
use crate::types::{AudioBuffer, StemCount};
use std::path::{Path, PathBuf};

/// Fetches a song's audio from a video URL
pub trait AudioDownloader: Send + Sync {
    /// Download the audio of `url` into `dir`, returning the local file
    ///
    /// Implementations may return an existing file instead of downloading
    /// again.
    fn download(&self, url: &str, dir: &Path) -> Result<PathBuf>;

    /// Check if the downloader can run (binary installed, etc.)
    fn is_available(&self) -> bool;

    /// Get the name of this downloader (for logging)
    fn name(&self) -> &'static str;
}

/// Splits a song into stems
pub trait StemSeparator: Send + Sync {
    /// Separate `input` into `stems` stems under `output_base`
    ///
    /// # Returns
    /// The directory holding the stem files for this input
    fn separate(&self, input: &Path, output_base: &Path, stems: StemCount) -> Result<PathBuf>;

    /// Check if the separator can run
    fn is_available(&self) -> bool;

    /// Get the name of this separator (for logging)
    fn name(&self) -> &'static str;
}

/// Shifts pitch by whole semitones without changing duration
pub trait PitchShifter: Send + Sync {
    /// Return a buffer with the same rate, channels and frame count as `buffer`
    fn shift(&self, buffer: &AudioBuffer, semitones: i32) -> Result<AudioBuffer>;

    /// Get the name of this shifter (for logging)
    fn name(&self) -> &'static str;
}
