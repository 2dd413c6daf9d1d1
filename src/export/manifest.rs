//! JSON run manifest written next to the stems

use crate::error::{MinusOneError, Result};
use crate::types::{Mix, PitchVariant, StemCount};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Manifest schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level manifest structure
#[derive(Debug, Serialize, Deserialize)]
pub struct RunManifest {
    /// Schema version for forward compatibility
    pub version: String,
    pub metadata: ManifestMetadata,
    /// URL or local file the run started from
    pub source: String,
    /// Audio file that was separated
    pub audio_file: PathBuf,
    pub stem_directory: PathBuf,
    pub stem_count: u8,
    /// Stem names in set order
    pub stems: Vec<String>,
    pub mixes: Vec<MixJson>,
    /// File the pitch variants were made from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_source: Option<PathBuf>,
    #[serde(default)]
    pub variants: Vec<VariantJson>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// minusone version that wrote this file
    pub generator_version: String,
    /// RFC 3339 timestamp
    pub exported_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixJson {
    pub excluded: String,
    pub included: Vec<String>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantJson {
    pub offset: i32,
    pub path: PathBuf,
}

/// What a finished run produced, borrowed for serialization
#[derive(Debug, Clone, Copy)]
pub struct RunRecord<'a> {
    pub source: &'a str,
    pub audio_file: &'a Path,
    pub stem_directory: &'a Path,
    pub stem_count: StemCount,
    pub stems: &'a [String],
    pub mixes: &'a [Mix],
    pub variants: &'a [PitchVariant],
}

/// Write the manifest
///
/// Writes to a temp file in the same directory and renames it over the
/// target, so a reader never sees a half-written manifest.
pub fn write_manifest(record: &RunRecord<'_>, output_path: &Path) -> Result<()> {
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| MinusOneError::OutputError {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    let writer = BufWriter::new(file);
    let manifest = to_manifest(record);

    serde_json::to_writer_pretty(writer, &manifest).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        MinusOneError::OutputError {
            path: output_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        MinusOneError::OutputError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!(
        "Wrote manifest ({} mixes, {} variants) to {}",
        manifest.mixes.len(),
        manifest.variants.len(),
        output_path.display()
    );

    Ok(())
}

fn to_manifest(record: &RunRecord<'_>) -> RunManifest {
    RunManifest {
        version: SCHEMA_VERSION.to_string(),
        metadata: ManifestMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
        },
        source: record.source.to_string(),
        audio_file: record.audio_file.to_path_buf(),
        stem_directory: record.stem_directory.to_path_buf(),
        stem_count: record.stem_count.count(),
        stems: record.stems.to_vec(),
        mixes: record
            .mixes
            .iter()
            .map(|m| MixJson {
                excluded: m.excluded.clone(),
                included: m.included.clone(),
                path: m.path.clone(),
            })
            .collect(),
        pitch_source: record.variants.first().map(|v| v.source.clone()),
        variants: record
            .variants
            .iter()
            .map(|v| VariantJson {
                offset: v.offset,
                path: v.path.clone(),
            })
            .collect(),
    }
}

/// Read a previously written manifest
///
/// Returns `None` if the file doesn't exist or can't be parsed.
pub fn read_manifest(path: &Path) -> Option<RunManifest> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            debug!("No readable manifest at {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_reader(BufReader::new(file)) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            debug!("Could not parse manifest {}: {}", path.display(), e);
            None
        }
    }
}
