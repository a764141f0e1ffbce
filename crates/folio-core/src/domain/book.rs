//! Book metadata.

use serde::{Deserialize, Serialize};

/// Metadata for one piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Content identifier; matches [`ChunkKey::content_id`](super::ChunkKey::content_id).
    pub id: String,

    /// Display title.
    pub title: String,

    /// Primary author.
    #[serde(default = "unknown_author")]
    pub author: String,

    /// Blurb shown in the library view.
    #[serde(default)]
    pub description: String,

    /// Cover image location, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,

    /// Number of chunks (pages) available from the content source.
    pub pages: u32,
}

fn unknown_author() -> String {
    "Unknown Author".to_string()
}

impl Book {
    /// Whether `index` names a chunk that exists for this book.
    pub const fn has_page(&self, index: u32) -> bool {
        index < self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_author_defaults() {
        let book: Book = serde_json::from_str(r#"{"id":"x","title":"X","pages":3}"#).unwrap();
        assert_eq!(book.author, "Unknown Author");
        assert!(book.cover_url.is_none());
        assert!(book.has_page(2));
        assert!(!book.has_page(3));
    }
}
