//! Core data types for minusone
//!
//! These types represent the domain model and flow through the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// =============================================================================
// Audio buffer types
// =============================================================================

/// Decoded audio, interleaved, at the source's own rate and channel layout
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Interleaved samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Number of interleaved channels
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        // Guard against division by zero - use 0 duration for invalid sample rate
        if self.sample_rate > 0 {
            self.frames() as f64 / self.sample_rate as f64
        } else {
            0.0
        }
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Split into one Vec per channel
    pub fn deinterleave(&self) -> Vec<Vec<f32>> {
        let channels = self.channels.max(1) as usize;
        let mut out = vec![Vec::with_capacity(self.frames()); channels];
        for frame in self.samples.chunks_exact(channels) {
            for (ch, &s) in frame.iter().enumerate() {
                out[ch].push(s);
            }
        }
        out
    }

    /// Create from per-channel sample vectors (truncated to the shortest)
    pub fn from_channels(channels: &[Vec<f32>], sample_rate: u32) -> Self {
        let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
        let mut samples = Vec::with_capacity(frames * channels.len());
        for i in 0..frames {
            for ch in channels {
                samples.push(ch[i]);
            }
        }
        Self::new(samples, channels.len() as u16, sample_rate)
    }
}

// =============================================================================
// Stems and derived outputs
// =============================================================================

/// One separated stem on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemFile {
    pub path: PathBuf,
    /// Name before the first `.` ("vocals" for `vocals.wav`)
    pub name: String,
    /// Extension after the last `.`, lowercase
    pub extension: String,
}

/// All stems of one song, sorted by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StemSet {
    pub directory: PathBuf,
    pub stems: Vec<StemFile>,
}

impl StemSet {
    pub fn len(&self) -> usize {
        self.stems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }

    /// Stem names in set order
    pub fn names(&self) -> Vec<&str> {
        self.stems.iter().map(|s| s.name.as_str()).collect()
    }
}

/// A leave-one-out mix written by the combiner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mix {
    /// Stem left out of this mix
    pub excluded: String,
    /// Stems overlaid into this mix
    pub included: Vec<String>,
    pub path: PathBuf,
}

/// A pitch-shifted copy of a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchVariant {
    pub source: PathBuf,
    /// Shift in semitones
    pub offset: i32,
    pub path: PathBuf,
}

// =============================================================================
// Configuration primitives
// =============================================================================

/// Separation presets offered by the separator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StemCount {
    /// Vocals and accompaniment
    #[default]
    Two,
    /// Vocals, drums, bass and other
    Four,
    /// Vocals, drums, bass, piano and other
    Five,
}

impl StemCount {
    pub fn from_count(count: u8) -> Option<Self> {
        match count {
            2 => Some(StemCount::Two),
            4 => Some(StemCount::Four),
            5 => Some(StemCount::Five),
            _ => None,
        }
    }

    pub fn count(self) -> u8 {
        match self {
            StemCount::Two => 2,
            StemCount::Four => 4,
            StemCount::Five => 5,
        }
    }

    /// Stem names the separator writes for this preset
    pub fn stem_names(self) -> &'static [&'static str] {
        match self {
            StemCount::Two => &["accompaniment", "vocals"],
            StemCount::Four => &["bass", "drums", "other", "vocals"],
            StemCount::Five => &["bass", "drums", "other", "piano", "vocals"],
        }
    }
}

impl fmt::Display for StemCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}stems", self.count())
    }
}

/// Half-open semitone range `start..stop` walked by `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchSchedule {
    pub start: i32,
    pub stop: i32,
    pub step: i32,
}

impl PitchSchedule {
    pub fn new(start: i32, stop: i32, step: i32) -> Self {
        Self { start, stop, step }
    }

    /// Offsets in schedule order; empty when the step is zero or points away from `stop`
    pub fn offsets(&self) -> Vec<i32> {
        let mut out = Vec::new();
        if self.step == 0 {
            return out;
        }
        let mut s = self.start;
        while (self.step > 0 && s < self.stop) || (self.step < 0 && s > self.stop) {
            out.push(s);
            match s.checked_add(self.step) {
                Some(next) => s = next,
                None => break,
            }
        }
        out
    }
}

impl Default for PitchSchedule {
    fn default() -> Self {
        Self::new(-5, 5, 2)
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio containers the decoder accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,
    M4a,
    Aiff,
}

impl AudioFormat {
    /// Every extension `from_extension` accepts, lowercase
    pub const EXTENSIONS: &'static [&'static str] = &[
        "wav", "mp3", "flac", "ogg", "m4a", "mp4", "aac", "aiff", "aif",
    ];

    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "wav" => Some(AudioFormat::Wav),
            "mp3" => Some(AudioFormat::Mp3),
            "flac" => Some(AudioFormat::Flac),
            "ogg" => Some(AudioFormat::Ogg),
            "m4a" | "mp4" | "aac" => Some(AudioFormat::M4a),
            "aiff" | "aif" => Some(AudioFormat::Aiff),
            _ => None,
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }
}
