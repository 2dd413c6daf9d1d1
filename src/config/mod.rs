//! Configuration and CLI handling

pub mod cli;
pub mod settings;

pub use cli::Cli;
pub use settings::{schedule_from_args, validate_schedule, Settings, Source};
