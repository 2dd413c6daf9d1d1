//! Stem discovery

pub mod scanner;

pub use scanner::{clear_stem_directory, scan_stems};
