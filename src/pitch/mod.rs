//! Pitch-shifted practice variants

pub mod generator;
pub mod resample;
pub mod shifter;
pub mod vocoder;

pub use generator::PitchVariantGenerator;
pub use shifter::{semitone_ratio, PhaseVocoderShifter, MAX_SEMITONES};
