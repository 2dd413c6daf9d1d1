//! Pitch variant generation
//!
//! Writes one pitch-shifted copy of a source file per schedule offset,
//! next to the source, named `<name>__<offset>.wav`.

use super::shifter::PhaseVocoderShifter;
use crate::audio::{self, OUTPUT_EXTENSION};
use crate::error::{MinusOneError, Result};
use crate::paths::variant_file_name;
use crate::traits::PitchShifter;
use crate::types::{PitchSchedule, PitchVariant};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Generates the schedule's pitch variants of one file
pub struct PitchVariantGenerator {
    schedule: PitchSchedule,
    shifter: Box<dyn PitchShifter>,
    show_progress: bool,
}

impl PitchVariantGenerator {
    /// Generator using the phase vocoder shifter
    pub fn new(schedule: PitchSchedule) -> Self {
        Self::with_shifter(schedule, Box::new(PhaseVocoderShifter::new()))
    }

    pub fn with_shifter(schedule: PitchSchedule, shifter: Box<dyn PitchShifter>) -> Self {
        Self {
            schedule,
            shifter,
            show_progress: false,
        }
    }

    /// Draw a progress bar while variants are written
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn schedule(&self) -> PitchSchedule {
        self.schedule
    }

    /// Paths `generate` would write for `source`
    pub fn plan(&self, source: &Path) -> Result<Vec<PathBuf>> {
        let (dir, file_name) = split_source(source)?;
        Ok(self
            .schedule
            .offsets()
            .into_iter()
            .map(|offset| dir.join(variant_file_name(file_name, offset, OUTPUT_EXTENSION)))
            .collect())
    }

    /// Write every variant of `source` beside it
    ///
    /// The source is decoded once. The first failing offset aborts the rest,
    /// and variants already written by this call are removed.
    pub fn generate(&self, source: &Path) -> Result<Vec<PitchVariant>> {
        if self.schedule.step == 0 {
            return Err(MinusOneError::ConfigError(
                "pitch schedule step must not be zero".to_string(),
            ));
        }
        if !source.is_file() {
            return Err(MinusOneError::FileNotFound(source.to_path_buf()));
        }
        let (dir, file_name) = split_source(source)?;

        let buffer = audio::decode_nonempty(source)?;
        let offsets = self.schedule.offsets();

        info!(
            "Generating {} pitch variants of {} with {}",
            offsets.len(),
            source.display(),
            self.shifter.name()
        );

        let progress = self.progress_bar(offsets.len());
        let mut variants: Vec<PitchVariant> = Vec::with_capacity(offsets.len());

        for offset in offsets {
            let out_path = dir.join(variant_file_name(file_name, offset, OUTPUT_EXTENSION));
            debug!("Shifting {:+} semitones -> {}", offset, out_path.display());

            let result = self
                .shifter
                .shift(&buffer, offset)
                .and_then(|shifted| audio::write_wav(&out_path, &shifted));

            if let Err(e) = result {
                let mut written: Vec<PathBuf> = variants.iter().map(|v| v.path.clone()).collect();
                written.push(out_path);
                remove_partial(&written);
                return Err(e);
            }

            info!("Wrote {}", out_path.display());
            if let Some(ref pb) = progress {
                pb.inc(1);
                pb.set_message(format!("{:+} semitones", offset));
            }

            variants.push(PitchVariant {
                source: source.to_path_buf(),
                offset,
                path: out_path,
            });
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Pitch variants complete");
        }

        Ok(variants)
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    }
}

impl Default for PitchVariantGenerator {
    fn default() -> Self {
        Self::new(PitchSchedule::default())
    }
}

/// Directory and UTF-8 file name of a source path
fn split_source(source: &Path) -> Result<(&Path, &str)> {
    let file_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            MinusOneError::invalid_identifier(
                source.display().to_string(),
                "source has no UTF-8 file name",
            )
        })?;
    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    Ok((dir, file_name))
}

fn remove_partial(paths: &[PathBuf]) {
    for path in paths {
        if path.is_file() {
            if let Err(e) = std::fs::remove_file(path) {
                warn!("Could not remove partial output {}: {}", path.display(), e);
            }
        }
    }
}
