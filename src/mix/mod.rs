//! Leave-one-out mixing of separated stems

pub mod combiner;

pub use combiner::{overlay, StemCombiner, MIN_STEMS_TO_COMBINE};
