//! Arbitrary-ratio resampling using rubato
//!
//! Pitch shifting stretches audio by a non-integer factor and then resamples
//! it back to the original length, so the ratio here is a plain `f64`
//! rather than a pair of sample rates.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

/// Input frames per rubato call
const CHUNK_SIZE: usize = 1024;

/// Resample one channel by `ratio` (output rate / input rate) to exactly `target_len` samples
pub fn resample_to_len(samples: &[f32], ratio: f64, target_len: usize) -> Vec<f32> {
    if samples.is_empty() || target_len == 0 {
        return vec![0.0; target_len];
    }
    if (ratio - 1.0).abs() < 1e-12 {
        return fit_length(samples.to_vec(), target_len);
    }

    match resample_sinc(samples, ratio, target_len) {
        Ok(out) => fit_length(out, target_len),
        Err(reason) => {
            debug!("Rubato resampling failed ({}), using fallback", reason);
            resample_linear_fallback(samples, target_len)
        }
    }
}

/// Band-limited sinc resampling, compensating for the resampler's delay
fn resample_sinc(samples: &[f32], ratio: f64, target_len: usize) -> Result<Vec<f32>, String> {
    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.925,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_SIZE, 1)
        .map_err(|e| e.to_string())?;

    let delay = resampler.output_delay();
    let wanted = target_len + delay;
    let mut output: Vec<f32> = Vec::with_capacity(wanted + CHUNK_SIZE);

    let mut pos = 0;
    while pos + resampler.input_frames_next() <= samples.len() {
        let n = resampler.input_frames_next();
        let chunk = resampler
            .process(&[&samples[pos..pos + n]], None)
            .map_err(|e| e.to_string())?;
        output.extend_from_slice(&chunk[0]);
        pos += n;
    }

    if pos < samples.len() {
        let chunk = resampler
            .process_partial(Some(&[&samples[pos..]]), None)
            .map_err(|e| e.to_string())?;
        output.extend_from_slice(&chunk[0]);
    }

    // Flush the filter tail until the delayed signal is fully out
    while output.len() < wanted {
        let chunk = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| e.to_string())?;
        if chunk[0].is_empty() {
            break;
        }
        output.extend_from_slice(&chunk[0]);
    }

    output.drain(..delay.min(output.len()));
    Ok(output)
}

/// Fallback linear interpolation resampler
///
/// Used only when rubato fails to initialize or process. This is a simple
/// linear interpolation that may introduce aliasing artifacts.
fn resample_linear_fallback(samples: &[f32], target_len: usize) -> Vec<f32> {
    if samples.len() == 1 || target_len == 1 {
        return vec![samples[0]; target_len];
    }

    let step = (samples.len() - 1) as f64 / (target_len - 1) as f64;
    (0..target_len)
        .map(|i| {
            let src_pos = i as f64 * step;
            let src_idx = src_pos as usize;
            let frac = (src_pos - src_idx as f64) as f32;
            if src_idx + 1 < samples.len() {
                samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
            } else {
                samples[samples.len() - 1]
            }
        })
        .collect()
}

/// Truncate or zero-pad to exactly `len`
pub fn fit_length(mut samples: Vec<f32>, len: usize) -> Vec<f32> {
    samples.resize(len, 0.0);
    samples
}
