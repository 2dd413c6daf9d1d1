//! Sequential pipeline: download, separate, combine, pitch

pub mod orchestrator;

pub use orchestrator::{
    pitch_stem_directory, run, run_combine, run_pitch, run_with, PipelineResult,
};
