//! Domain types for folio.
//!
//! Pure data types with no infrastructure dependencies.

mod book;
mod chunk;
mod speech;

pub use book::Book;
pub use chunk::{Chunk, ChunkKey};
pub use speech::{ExpressiveParams, VoiceInfo, VoiceParams, WordBoundary};
