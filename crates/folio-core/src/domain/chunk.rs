//! Chunk identity and payload types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one chunk of one piece of content.
///
/// The same key names both a cache slot and an in-flight prefetch marker.
/// Its canonical string form is `"{content_id}-{index}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    content_id: String,
    index: u32,
}

impl ChunkKey {
    /// Create a key for chunk `index` of `content_id`.
    pub fn new(content_id: impl Into<String>, index: u32) -> Self {
        Self {
            content_id: content_id.into(),
            index,
        }
    }

    /// The content (book) identifier.
    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    /// Zero-based chunk index within the content.
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// The key `offset` chunks after this one, or `None` on index overflow.
    #[must_use]
    pub fn offset(&self, offset: u32) -> Option<Self> {
        self.index.checked_add(offset).map(|index| Self {
            content_id: self.content_id.clone(),
            index,
        })
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.content_id, self.index)
    }
}

/// One page/section of content: the unit of caching and prefetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Which chunk this is.
    pub key: ChunkKey,

    /// Plain page text.
    pub text: String,
}

impl Chunk {
    /// Create a chunk.
    pub fn new(key: ChunkKey, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
        }
    }

    /// Whitespace-separated word count of the page text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
