//! Audio decoding using symphonia
//!
//! Decodes a whole file into an interleaved f32 buffer. Channel layout and
//! sample rate are kept as-is: stems are remixed and written back at their
//! own rate, so nothing here resamples.

use crate::error::{MinusOneError, Result};
use crate::types::AudioBuffer;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace};

/// Maximum file size we'll attempt to decode (2GB)
/// Prevents OOM on extremely large files
const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Decode an audio file to an interleaved AudioBuffer
pub fn decode(path: &Path) -> Result<AudioBuffer> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        MinusOneError::decode_error(path, format!("Failed to read file metadata: {}", e))
    })?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(MinusOneError::decode_error(
            path,
            format!(
                "File too large ({:.1} GB). Maximum supported size is 2 GB.",
                metadata.len() as f64 / (1024.0 * 1024.0 * 1024.0)
            ),
        ));
    }

    let file = std::fs::File::open(path)
        .map_err(|e| MinusOneError::decode_error(path, format!("Failed to open file: {}", e)))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Provide a hint based on file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| MinusOneError::decode_error(path, format!("Failed to probe format: {}", e)))?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| MinusOneError::decode_error(path, "No audio tracks found"))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(0);

    debug!(
        "Decoding: {} @ {}Hz, {} channels",
        path.display(),
        sample_rate,
        channels
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| {
            MinusOneError::decode_error(path, format!("Failed to create decoder: {}", e))
        })?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break; // End of stream
            }
            Err(e) => {
                return Err(MinusOneError::decode_error(
                    path,
                    format!("Failed to read packet: {}", e),
                ));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                // Skip corrupted frames
                trace!("Skipping corrupted frame: {}", e);
                continue;
            }
            Err(e) => {
                return Err(MinusOneError::decode_error(
                    path,
                    format!("Decode error: {}", e),
                ));
            }
        };

        let spec = *decoded.spec();
        // The decoded spec is authoritative; container headers may omit it
        sample_rate = spec.rate;
        channels = spec.channels.count();

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        all_samples.extend_from_slice(sample_buf.samples());
    }

    if channels == 0 {
        return Err(MinusOneError::decode_error(path, "Unknown channel layout"));
    }

    let buffer = AudioBuffer::new(all_samples, channels as u16, sample_rate);

    debug!(
        "Decoded {} frames ({:.2}s) from {}",
        buffer.frames(),
        buffer.duration(),
        path.display()
    );

    Ok(buffer)
}

/// Decode and reject buffers that cannot be processed further
pub fn decode_nonempty(path: &Path) -> Result<AudioBuffer> {
    let buffer = decode(path)?;
    ensure_processable(path, &buffer)?;
    Ok(buffer)
}

/// Fail with `UnsupportedFormat` on a zero sample rate or an empty buffer
pub fn ensure_processable(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    if buffer.sample_rate == 0 {
        return Err(MinusOneError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: "sample rate is zero".to_string(),
        });
    }
    if buffer.is_empty() {
        return Err(MinusOneError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: "file contains no audio samples".to_string(),
        });
    }
    Ok(())
}
