//! Unified error types for minusone
//!
//! Error strategy:
//! - Every stage returns an explicit `Result`; nothing is retried
//! - The pipeline wraps a failing stage's error with the stage name and
//!   aborts the remaining stages
//!
//! All errors include actionable suggestions where possible.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "WAV, MP3, FLAC, OGG/Vorbis, AAC/M4A";

/// Pipeline stage, used to tell the user where a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Separate,
    Combine,
    Pitch,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Download => "download",
            Stage::Separate => "separation",
            Stage::Combine => "combine",
            Stage::Pitch => "pitch",
            Stage::Export => "export",
        };
        f.write_str(name)
    }
}

/// Top-level error type for minusone operations
#[derive(Debug, Error)]
pub enum MinusOneError {
    // =========================================================================
    // Input errors
    // =========================================================================
    #[error("Invalid source identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    #[error("'{0}' is not a video URL\n  Tip: Pass a full http(s):// link, e.g. https://www.youtube.com/watch?v=...")]
    InvalidUrl(String),

    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    // =========================================================================
    // Audio errors
    // =========================================================================
    #[error("Failed to decode audio file '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file plays in other apps, it may be corrupted or use an unsupported codec")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Unsupported audio for '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("Stems '{first}' and '{second}' share the base name '{name}'\n  Tip: Remove or rename one of them so each stem name is unique")]
    DuplicateStem {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    // =========================================================================
    // External tool errors
    // =========================================================================
    #[error("{tool} is not available: {reason}\n  Tip: Install it and make sure it is on PATH, or point {env_var} at the binary")]
    ToolUnavailable {
        tool: &'static str,
        env_var: &'static str,
        reason: String,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    // =========================================================================
    // Output and configuration errors
    // =========================================================================
    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<MinusOneError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for minusone operations
pub type Result<T> = std::result::Result<T, MinusOneError>;

impl MinusOneError {
    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MinusOneError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        MinusOneError::InvalidIdentifier {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!(
                    "Permission denied. Check that you have write access to {}",
                    path.display()
                )
            }
            std::io::ErrorKind::NotFound => {
                format!(
                    "Directory does not exist: {}",
                    path.parent()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                )
            }
            _ => err.to_string(),
        };
        MinusOneError::OutputError { path, reason }
    }

    /// The stage a pipeline error came from, if it was wrapped with one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            MinusOneError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The innermost error, skipping stage wrappers
    pub fn root(&self) -> &MinusOneError {
        match self {
            MinusOneError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Extension trait for tagging errors with the pipeline stage they came from
pub trait StageContext<T> {
    fn in_stage(self, stage: Stage) -> Result<T>;
}

impl<T> StageContext<T> for Result<T> {
    fn in_stage(self, stage: Stage) -> Result<T> {
        self.map_err(|e| MinusOneError::Stage {
            stage,
            source: Box::new(e),
        })
    }
}
