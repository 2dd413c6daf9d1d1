//! Phase vocoder pitch shifter
//!
//! Shifting by `s` semitones stretches each channel by `2^(s/12)` with the
//! phase vocoder, then resamples it back to the original length. Duration
//! and sample rate are unchanged; frequencies scale by the stretch factor.

use super::resample::resample_to_len;
use super::vocoder::time_stretch;
use crate::error::{MinusOneError, Result};
use crate::traits::PitchShifter;
use crate::types::AudioBuffer;
use tracing::trace;

/// Largest shift accepted in either direction (two octaves)
pub const MAX_SEMITONES: i32 = 24;

/// Frequency ratio for a shift of `semitones`
pub fn semitone_ratio(semitones: i32) -> f64 {
    2f64.powf(semitones as f64 / 12.0)
}

/// Default pitch shifter
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseVocoderShifter;

impl PhaseVocoderShifter {
    pub fn new() -> Self {
        Self
    }
}

impl PitchShifter for PhaseVocoderShifter {
    fn shift(&self, buffer: &AudioBuffer, semitones: i32) -> Result<AudioBuffer> {
        if semitones.abs() > MAX_SEMITONES {
            return Err(MinusOneError::ConfigError(format!(
                "pitch shift of {} semitones is outside ±{}",
                semitones, MAX_SEMITONES
            )));
        }
        if semitones == 0 || buffer.is_empty() {
            return Ok(buffer.clone());
        }

        let factor = semitone_ratio(semitones);
        let frames = buffer.frames();

        let shifted: Vec<Vec<f32>> = buffer
            .deinterleave()
            .iter()
            .map(|channel| {
                let stretched = time_stretch(channel, factor);
                trace!(
                    "Stretched {} -> {} samples (x{:.4})",
                    channel.len(),
                    stretched.len(),
                    factor
                );
                resample_to_len(&stretched, 1.0 / factor, frames)
            })
            .collect();

        Ok(AudioBuffer::from_channels(&shifted, buffer.sample_rate))
    }

    fn name(&self) -> &'static str {
        "phase-vocoder"
    }
}
