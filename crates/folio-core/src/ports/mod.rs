//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No filesystem, network, or audio types in any signature
//! - Every port is `Send + Sync` so it can be shared behind `Arc<dyn _>`
//! - Infallible collaborators (the diagnostic sink) return `()`

pub mod content_source;
pub mod diagnostics;
pub mod preferences;
pub mod speech_engine;

pub use content_source::{ContentError, ContentSource};
pub use diagnostics::{DiagnosticSink, NoopDiagnostics, TracingDiagnostics};
pub use preferences::{InMemoryPreferences, PreferenceError, PreferenceStore};
pub use speech_engine::{EngineError, EngineEvent, SpeechEngine, SpeechRequest};
