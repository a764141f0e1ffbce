//! Content source port: where book metadata and page text come from.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Book, Chunk, ChunkKey};

/// Errors a content source can report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    /// The requested chunk or book does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The source exists but could not serve the request (I/O, network, parse).
    #[error("Content source unavailable: {0}")]
    Unavailable(String),
}

impl ContentError {
    /// Shorthand for a missing chunk.
    pub fn chunk_not_found(key: &ChunkKey) -> Self {
        Self::NotFound(format!("chunk {key}"))
    }

    /// Shorthand for a missing book.
    pub fn book_not_found(id: &str) -> Self {
        Self::NotFound(format!("book {id}"))
    }
}

/// Serves book metadata and page text.
///
/// Implementations must be `Send + Sync`; the prefetch coordinator shares one
/// instance across concurrent fetches.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch one chunk of page text.
    async fn fetch_chunk(&self, key: &ChunkKey) -> Result<Chunk, ContentError>;

    /// Fetch book metadata.
    async fn fetch_book(&self, id: &str) -> Result<Book, ContentError>;
}
