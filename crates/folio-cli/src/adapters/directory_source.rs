//! Filesystem-backed content source.
//!
//! Layout under the library root:
//!
//! ```text
//! <root>/<book-id>/book.json   metadata
//! <root>/<book-id>/0.txt       page 0
//! <root>/<book-id>/1.txt       page 1
//! ```

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use folio_core::{Book, Chunk, ChunkKey, ContentError, ContentSource};

const MANIFEST_FILE: &str = "book.json";

/// On-disk metadata. `pages` is derived from the page files when absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookManifest {
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    cover_url: Option<String>,
    #[serde(default)]
    pages: Option<u32>,
}

/// Serves books from a library directory.
#[derive(Debug, Clone)]
pub struct DirectoryContentSource {
    root: PathBuf,
}

impl DirectoryContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids of every directory in the library that carries a manifest, sorted.
    pub async fn list_books(&self) -> Result<Vec<String>, ContentError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unavailable(&self.root, &e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| unavailable(&self.root, &e))?
        {
            let path = entry.path();
            let has_manifest = tokio::fs::metadata(path.join(MANIFEST_FILE))
                .await
                .is_ok_and(|m| m.is_file());
            if !has_manifest {
                continue;
            }
            if let Some(id) = path.file_name().and_then(|n| n.to_str()) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Directory for `id`, or `None` if `id` is not a single plain path
    /// component.
    fn book_dir(&self, id: &str) -> Option<PathBuf> {
        let mut components = Path::new(id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.root.join(id)),
            _ => None,
        }
    }

    async fn count_pages(dir: &Path) -> Result<u32, ContentError> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| unavailable(dir, &e))?;

        let mut pages = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| unavailable(dir, &e))?
        {
            let path = entry.path();
            let is_page = path.extension().is_some_and(|ext| ext == "txt")
                && path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.parse::<u32>().is_ok());
            if is_page {
                pages += 1;
            }
        }
        Ok(pages)
    }
}

#[async_trait]
impl ContentSource for DirectoryContentSource {
    async fn fetch_chunk(&self, key: &ChunkKey) -> Result<Chunk, ContentError> {
        let Some(dir) = self.book_dir(key.content_id()) else {
            return Err(ContentError::chunk_not_found(key));
        };
        let path = dir.join(format!("{}.txt", key.index()));

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(key = %key, path = %path.display(), "Read page");
                Ok(Chunk::new(key.clone(), text.trim_end()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ContentError::chunk_not_found(key)),
            Err(e) => Err(unavailable(&path, &e)),
        }
    }

    async fn fetch_book(&self, id: &str) -> Result<Book, ContentError> {
        let Some(dir) = self.book_dir(id) else {
            return Err(ContentError::book_not_found(id));
        };
        let path = dir.join(MANIFEST_FILE);

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ContentError::book_not_found(id));
            }
            Err(e) => return Err(unavailable(&path, &e)),
        };
        let manifest: BookManifest = serde_json::from_str(&raw)
            .map_err(|e| ContentError::Unavailable(format!("{}: {e}", path.display())))?;

        let pages = match manifest.pages {
            Some(pages) => pages,
            None => Self::count_pages(&dir).await?,
        };

        Ok(Book {
            id: id.to_string(),
            title: manifest.title,
            author: manifest
                .author
                .unwrap_or_else(|| "Unknown Author".to_string()),
            description: manifest.description,
            cover_url: manifest.cover_url,
            pages,
        })
    }
}

fn unavailable(path: &Path, err: &std::io::Error) -> ContentError {
    ContentError::Unavailable(format!("{}: {err}", path.display()))
}
