//! Deterministic directory resolution
//!
//! The separator writes stems to `<base>/<input file name minus extension>/`.
//! Everything downstream finds that directory again through
//! [`resolve_stem_directory`], so it must stay pure string work.

use super::naming::stem_name;
use crate::error::{MinusOneError, Result};
use crate::types::AudioFormat;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Containers yt-dlp may leave behind that the decoder does not read
const DOWNLOAD_EXTENSIONS: &[&str] = &["webm", "opus"];

/// Extensions stripped from a source identifier
fn is_media_extension(ext: &str) -> bool {
    AudioFormat::from_extension(ext).is_some()
        || DOWNLOAD_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// Stem names the pitch stage looks for, most preferred first
pub const PITCH_TARGETS: [&str; 2] = ["without_vocals", "accompaniment"];

/// Join the extension-less basename of `source_identifier` under `base_output_dir`
pub fn resolve_stem_directory(base_output_dir: &Path, source_identifier: &str) -> Result<PathBuf> {
    if source_identifier.is_empty() {
        return Err(MinusOneError::invalid_identifier(
            source_identifier,
            "identifier is empty",
        ));
    }

    let basename = source_identifier
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    if basename.is_empty() {
        return Err(MinusOneError::invalid_identifier(
            source_identifier,
            "identifier ends with a path separator and has no file name",
        ));
    }

    let name = match basename.rsplit_once('.') {
        Some((name, ext)) if is_media_extension(ext) => name,
        _ => basename,
    };
    if name.is_empty() || name == "." || name == ".." {
        return Err(MinusOneError::invalid_identifier(
            source_identifier,
            "file name is empty once the extension is removed",
        ));
    }

    Ok(base_output_dir.join(name))
}

/// Lowercase, spaces to underscores, keep only alphanumerics and `_`
pub fn clean_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Pick the file to pitch-shift: `without_vocals` if present, else `accompaniment`
pub fn select_pitch_target(stem_dir: &Path) -> Result<PathBuf> {
    if !stem_dir.is_dir() {
        return Err(MinusOneError::FileNotFound(stem_dir.to_path_buf()));
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(stem_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && AudioFormat::is_supported_path(p))
        .collect();
    candidates.sort();

    for target in PITCH_TARGETS {
        let found = candidates.iter().find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| stem_name(n) == target)
                .unwrap_or(false)
        });
        if let Some(path) = found {
            debug!("Pitch target: {}", path.display());
            return Ok(path.clone());
        }
    }

    Err(MinusOneError::FileNotFound(
        stem_dir.join(format!("{}.wav", PITCH_TARGETS[0])),
    ))
}
