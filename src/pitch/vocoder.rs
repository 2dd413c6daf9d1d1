//! Phase vocoder time stretching
//!
//! Stretches a signal in time without changing its pitch. Frames are read at
//! an analysis hop of `SYNTHESIS_HOP / factor` and written at `SYNTHESIS_HOP`,
//! with each bin's phase advanced by its measured instantaneous frequency.
//!
//! # Parameters
//!
//! - **FRAME_SIZE = 2048**: ~46ms at 44.1kHz, ~21.5 Hz bin spacing
//! - **SYNTHESIS_HOP = 512**: 75% overlap, Hann windowed on analysis and
//!   synthesis, normalized by the summed squared window

use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;

/// FFT frame length
pub const FRAME_SIZE: usize = 2048;

/// Output hop between frames
pub const SYNTHESIS_HOP: usize = FRAME_SIZE / 4;

/// Bins in the positive half of the spectrum
const NUM_BINS: usize = FRAME_SIZE / 2 + 1;

/// Stretch `samples` to `round(len * factor)` samples, keeping pitch
pub fn time_stretch(samples: &[f32], factor: f64) -> Vec<f32> {
    let out_len = (samples.len() as f64 * factor).round() as usize;
    if samples.is_empty() || (factor - 1.0).abs() < 1e-12 {
        let mut same = samples.to_vec();
        same.resize(out_len, 0.0);
        return same;
    }

    let n = FRAME_SIZE;
    let hs = SYNTHESIS_HOP;
    let ha = hs as f64 / factor;

    // Zero-pad both ends so every input sample sits under full window coverage
    let mut padded = vec![0.0f32; n];
    padded.extend_from_slice(samples);
    padded.extend(std::iter::repeat(0.0).take(n));

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);
    let window = hann_window(n);

    let num_frames = ((padded.len() - n) as f64 / ha).floor() as usize + 1;
    let total_len = (num_frames - 1) * hs + n;
    let mut output = vec![0.0f32; total_len];
    let mut window_sum = vec![0.0f32; total_len];

    let mut prev_phase = vec![0.0f64; NUM_BINS];
    let mut syn_phase = vec![0.0f64; NUM_BINS];
    let mut prev_pos = 0usize;
    let mut buffer = vec![Complex::new(0.0f32, 0.0); n];

    for frame in 0..num_frames {
        let pos = ((frame as f64 * ha).round() as usize).min(padded.len() - n);

        for (i, b) in buffer.iter_mut().enumerate() {
            *b = Complex::new(padded[pos + i] * window[i], 0.0);
        }
        fft.process(&mut buffer);

        let hop = (pos - prev_pos) as f64;
        for k in 0..NUM_BINS {
            let phase = buffer[k].arg() as f64;
            if frame == 0 || hop == 0.0 {
                syn_phase[k] = phase;
            } else {
                let omega = 2.0 * PI * k as f64 / n as f64;
                let deviation = wrap_phase(phase - prev_phase[k] - omega * hop);
                let inst_freq = omega + deviation / hop;
                syn_phase[k] = wrap_phase(syn_phase[k] + inst_freq * hs as f64);
            }
            prev_phase[k] = phase;
        }
        prev_pos = pos;

        // Rebuild a conjugate-symmetric spectrum with the synthesis phases
        for k in 0..NUM_BINS {
            let mag = buffer[k].norm();
            buffer[k] = Complex::from_polar(mag, syn_phase[k] as f32);
        }
        for k in 1..NUM_BINS - 1 {
            buffer[n - k] = buffer[k].conj();
        }
        ifft.process(&mut buffer);

        let start = frame * hs;
        let scale = 1.0 / n as f32;
        for (i, &w) in window.iter().enumerate() {
            output[start + i] += buffer[i].re * scale * w;
            window_sum[start + i] += w * w;
        }
    }

    for (s, &ws) in output.iter_mut().zip(window_sum.iter()) {
        if ws > 1e-8 {
            *s /= ws;
        }
    }

    // The leading pad of `n` input samples became `n * factor` output samples
    let offset = (n as f64 * factor).round() as usize;
    let mut stretched: Vec<f32> = output.into_iter().skip(offset).take(out_len).collect();
    stretched.resize(out_len, 0.0);
    stretched
}

/// Wrap a phase into [-PI, PI]
fn wrap_phase(phase: f64) -> f64 {
    phase - 2.0 * PI * (phase / (2.0 * PI)).round()
}

/// Periodic Hann window
fn hann_window(size: usize) -> Vec<f32> {
    use std::f32::consts::PI;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}
