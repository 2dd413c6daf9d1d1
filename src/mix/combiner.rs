//! Leave-one-out stem recombination
//!
//! For a song separated into N stems, writes N mixes: each one overlays every
//! stem except one. Nothing happens for two stems or fewer, since leaving one
//! out of a pair is just the other stem.

use crate::audio::{self, OUTPUT_EXTENSION};
use crate::discovery;
use crate::error::{MinusOneError, Result};
use crate::paths::mix_file_name;
use crate::types::{AudioBuffer, Mix, StemSet};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Stem sets at or below this size are left alone
pub const MIN_STEMS_TO_COMBINE: usize = 3;

/// Writes `without_<stem>` mixes into a stem directory
#[derive(Debug, Clone, Default)]
pub struct StemCombiner {
    show_progress: bool,
}

impl StemCombiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a progress bar while mixes are written
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Paths `combine` would write for `stem_dir`, without decoding anything
    pub fn plan(&self, stem_dir: &Path) -> Result<Vec<PathBuf>> {
        let set = discovery::scan_stems(stem_dir)?;
        if set.len() < MIN_STEMS_TO_COMBINE {
            return Ok(Vec::new());
        }
        Ok(set
            .stems
            .iter()
            .map(|s| stem_dir.join(mix_file_name(&s.name, OUTPUT_EXTENSION)))
            .collect())
    }

    /// Write one mix per stem into `stem_dir`
    ///
    /// Returns an empty list, and writes nothing, for two stems or fewer.
    /// If any mix fails, the mixes this call already wrote are removed.
    pub fn combine(&self, stem_dir: &Path) -> Result<Vec<Mix>> {
        let set = discovery::scan_stems(stem_dir)?;

        if set.len() < MIN_STEMS_TO_COMBINE {
            info!(
                "{} stem(s) in {}, nothing to combine",
                set.len(),
                stem_dir.display()
            );
            return Ok(Vec::new());
        }

        let buffers = load_stems(&set)?;

        let progress = self.progress_bar(set.len());
        let mut written: Vec<PathBuf> = Vec::with_capacity(set.len());
        let mut mixes: Vec<Mix> = Vec::with_capacity(set.len());

        for (excluded_idx, excluded) in set.stems.iter().enumerate() {
            let complement: Vec<&AudioBuffer> = buffers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != excluded_idx)
                .map(|(_, b)| b)
                .collect();
            let included: Vec<String> = set
                .stems
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != excluded_idx)
                .map(|(_, s)| s.name.clone())
                .collect();

            let out_path = stem_dir.join(mix_file_name(&excluded.name, OUTPUT_EXTENSION));
            debug!(
                "Mixing {} -> {}",
                included.join(" + "),
                out_path.display()
            );

            let mixed = overlay(&complement);
            if let Err(e) = audio::write_wav(&out_path, &mixed) {
                written.push(out_path);
                remove_partial(&written);
                return Err(e);
            }
            written.push(out_path.clone());

            info!("Wrote {}", out_path.display());
            if let Some(ref pb) = progress {
                pb.inc(1);
                pb.set_message(mix_file_name(&excluded.name, OUTPUT_EXTENSION));
            }

            mixes.push(Mix {
                excluded: excluded.name.clone(),
                included,
                path: out_path,
            });
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Mixes complete");
        }

        Ok(mixes)
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

/// Decode every stem once and check they can be overlaid
fn load_stems(set: &StemSet) -> Result<Vec<AudioBuffer>> {
    let mut buffers: Vec<AudioBuffer> = Vec::with_capacity(set.len());

    for stem in &set.stems {
        let buffer = audio::decode_nonempty(&stem.path)?;

        if let Some(first) = buffers.first() {
            if buffer.sample_rate != first.sample_rate || buffer.channels != first.channels {
                return Err(MinusOneError::UnsupportedFormat {
                    path: stem.path.clone(),
                    reason: format!(
                        "{}Hz/{}ch does not match {}Hz/{}ch of '{}'",
                        buffer.sample_rate,
                        buffer.channels,
                        first.sample_rate,
                        first.channels,
                        set.stems[0].path.display()
                    ),
                });
            }
        }
        buffers.push(buffer);
    }

    Ok(buffers)
}

/// Sum buffers sample by sample from time zero, then clip to [-1.0, 1.0]
///
/// Shorter buffers are treated as silence past their end. Clipping happens
/// once after the full sum, so the result does not depend on input order.
pub fn overlay(buffers: &[&AudioBuffer]) -> AudioBuffer {
    let Some(first) = buffers.first() else {
        return AudioBuffer::new(Vec::new(), 1, 0);
    };

    let len = buffers.iter().map(|b| b.samples.len()).max().unwrap_or(0);
    let mut sum = vec![0.0f32; len];

    for buffer in buffers {
        for (acc, &s) in sum.iter_mut().zip(buffer.samples.iter()) {
            *acc += s;
        }
    }
    for s in &mut sum {
        *s = s.clamp(-1.0, 1.0);
    }

    AudioBuffer::new(sum, first.channels, first.sample_rate)
}

/// Best-effort removal of mixes written before a failure
fn remove_partial(paths: &[PathBuf]) {
    for path in paths {
        if path.is_file() {
            if let Err(e) = std::fs::remove_file(path) {
                warn!("Could not remove partial output {}: {}", path.display(), e);
            }
        }
    }
}
