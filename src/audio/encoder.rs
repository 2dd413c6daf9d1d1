//! WAV encoding using hound
//!
//! Every file this tool writes is 16-bit PCM WAV at the buffer's own rate
//! and channel count. Samples outside [-1.0, 1.0] are clipped.

use crate::error::{MinusOneError, Result};
use crate::types::AudioBuffer;
use std::path::Path;
use tracing::debug;

/// Extension of every file the encoder produces
pub const OUTPUT_EXTENSION: &str = "wav";

/// Write an interleaved buffer to a 16-bit WAV file
pub fn write_wav(path: &Path, audio: &AudioBuffer) -> Result<()> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| wav_error(path, e))?;

    for &sample in &audio.samples {
        writer
            .write_sample(to_i16(sample))
            .map_err(|e| wav_error(path, e))?;
    }

    writer.finalize().map_err(|e| wav_error(path, e))?;

    debug!(
        "Wrote {} frames to {}",
        audio.frames(),
        path.display()
    );
    Ok(())
}

/// Scale a float sample to 16-bit, clipping out-of-range values
fn to_i16(sample: f32) -> i16 {
    (sample * 32767.0).round().clamp(-32768.0, 32767.0) as i16
}

fn wav_error(path: &Path, err: hound::Error) -> MinusOneError {
    match err {
        hound::Error::IoError(io) => MinusOneError::output_error(path, io),
        other => MinusOneError::OutputError {
            path: path.to_path_buf(),
            reason: format!("Failed to write WAV: {}", other),
        },
    }
}
