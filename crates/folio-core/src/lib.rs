#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{Book, Chunk, ChunkKey, ExpressiveParams, VoiceInfo, VoiceParams, WordBoundary};
pub use ports::{
    ContentError, ContentSource, DiagnosticSink, EngineError, EngineEvent, InMemoryPreferences,
    NoopDiagnostics, PreferenceError, PreferenceStore, SpeechEngine, SpeechRequest,
    TracingDiagnostics,
};
pub use settings::{
    DEFAULT_BOOK_CACHE_CAPACITY, DEFAULT_CHUNK_CACHE_CAPACITY, DEFAULT_PREFETCH_COUNT, Settings,
    SettingsError, validate_settings,
};
