//! Stem directory scanning

use crate::error::{MinusOneError, Result};
use crate::paths::{is_derived_file_name, stem_name};
use crate::types::{AudioFormat, StemFile, StemSet};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Collect the stems of one song from `dir`
///
/// Only the directory's own files are considered. Mixes, pitch variants and
/// the run manifest written by earlier runs are skipped, so scanning a
/// directory that was already processed yields the same set as before.
pub fn scan_stems(dir: &Path) -> Result<StemSet> {
    if !dir.exists() {
        return Err(MinusOneError::FileNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(MinusOneError::invalid_identifier(
            dir.display().to_string(),
            "expected a directory of stems",
        ));
    }

    let mut stems: Vec<StemFile> = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(stem) = try_discover_stem(path) {
            debug!("Discovered stem '{}': {}", stem.name, path.display());
            stems.push(stem);
        }
    }

    check_unique_names(&stems)?;
    stems.sort_by(|a, b| a.name.cmp(&b.name));

    info!("Found {} stems in {}", stems.len(), dir.display());
    if stems.is_empty() {
        warn!("No supported audio stems found in {}", dir.display());
    }

    Ok(StemSet {
        directory: dir.to_path_buf(),
        stems,
    })
}

/// Remove the stems and derived files of an earlier run from `dir`
///
/// Files that are neither audio nor written by this tool are left alone.
/// Returns how many files were removed.
pub fn clear_stem_directory(dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let owned = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| is_derived_file_name(n) || AudioFormat::is_supported_path(path))
            .unwrap_or(false);
        if owned {
            std::fs::remove_file(path).map_err(|e| MinusOneError::output_error(path, e))?;
            debug!("Removed stale {}", path.display());
            removed += 1;
        }
    }

    if removed > 0 {
        info!("Cleared {} files from {}", removed, dir.display());
    }
    Ok(removed)
}

/// Try to create a StemFile if the path is a supported, non-derived audio file
fn try_discover_stem(path: &Path) -> Option<StemFile> {
    let file_name = path.file_name()?.to_str()?;
    if is_derived_file_name(file_name) {
        debug!("Skipping derived file: {}", file_name);
        return None;
    }

    let ext = path.extension()?.to_str()?;
    AudioFormat::from_extension(ext)?;

    Some(StemFile {
        path: path.to_path_buf(),
        name: stem_name(file_name).to_string(),
        extension: ext.to_lowercase(),
    })
}

/// Fail fast when two files collapse to the same stem name
fn check_unique_names(stems: &[StemFile]) -> Result<()> {
    let mut seen: HashMap<&str, &StemFile> = HashMap::new();
    for stem in stems {
        if let Some(first) = seen.insert(stem.name.as_str(), stem) {
            return Err(MinusOneError::DuplicateStem {
                name: stem.name.clone(),
                first: first.path.clone(),
                second: stem.path.clone(),
            });
        }
    }
    Ok(())
}
