#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use async_trait as _;

pub mod controller;
pub mod error;
pub mod estimate;
pub mod rules;
pub mod transform;
pub mod voices;

// Re-export key types for convenience
pub use controller::{
    PlaybackConfig, PlaybackController, PlaybackEvent, PlaybackState, SessionId, SessionInfo,
    SessionOutcome,
};
pub use error::{PlaybackError, RuleError};
pub use estimate::{estimate_reading_seconds, estimate_speaking_duration};
pub use rules::{DictionaryEntry, EmotionRule, RewriteRule, RuleSet, STANDARD_RULES_VERSION};
pub use transform::{TextTransformPipeline, TransformedText};
pub use voices::{DEFAULT_MIN_VOICE_SCORE, rank_voices, score_voice};
