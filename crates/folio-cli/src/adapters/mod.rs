//! Concrete port implementations wired in by the CLI.

mod directory_source;
mod json_preferences;
mod simulated_engine;

pub use directory_source::DirectoryContentSource;
pub use json_preferences::JsonFilePreferences;
pub use simulated_engine::SimulatedSpeechEngine;
