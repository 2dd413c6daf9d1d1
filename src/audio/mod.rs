//! Audio decoding (symphonia) and encoding (hound)

pub mod decoder;
pub mod encoder;

pub use decoder::{decode, decode_nonempty, ensure_processable};
pub use encoder::{write_wav, OUTPUT_EXTENSION};
