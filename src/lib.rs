//! minusone - practice tracks from any song
//!
//! Downloads a song's audio, separates it into stems, and writes
//! "minus-one" mixes: one per stem, with that stem left out. The backing
//! track can also be pitch-shifted to a range of keys.
//!
//! # Architecture
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `paths`: stem directory resolution and output file naming
//! - `audio`: decoding with symphonia, WAV encoding with hound
//! - `discovery`: stem file listing
//! - `mix`: leave-one-out stem recombination
//! - `pitch`: pitch variant generation (phase vocoder + resampling)
//! - `external`: yt-dlp and spleeter subprocess backends
//! - `pipeline`: sequential stage orchestration
//! - `export`: JSON run manifest
//!
//! # Example
//!
//! ```no_run
//! use minusone::mix::StemCombiner;
//! use std::path::Path;
//!
//! let mixes = StemCombiner::new()
//!     .combine(Path::new("audio_output/my_song"))
//!     .expect("combine failed");
//! for mix in &mixes {
//!     println!("{}", mix.path.display());
//! }
//! ```

pub mod audio;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod external;
pub mod mix;
pub mod paths;
pub mod pipeline;
pub mod pitch;
pub mod traits;
pub mod types;

// Re-export key types at crate root
pub use error::{MinusOneError, Result, Stage};
pub use mix::StemCombiner;
pub use pitch::PitchVariantGenerator;
pub use types::{AudioBuffer, Mix, PitchSchedule, PitchVariant, StemCount};
