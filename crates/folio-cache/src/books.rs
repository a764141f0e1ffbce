//! Book metadata cache.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use folio_core::{Book, ContentError, ContentSource};

use crate::bounded::BoundedCache;

/// Read-through cache of [`Book`] records, keyed by book id.
///
/// Concurrent misses on the same id both reach the source; book records are
/// small and fetched once per book open.
pub struct BookCache {
    source: Arc<dyn ContentSource>,
    cache: Mutex<BoundedCache<String, Book>>,
}

impl BookCache {
    /// Create a cache holding at most `capacity` books.
    pub fn new(source: Arc<dyn ContentSource>, capacity: NonZeroUsize) -> Self {
        Self {
            source,
            cache: Mutex::new(BoundedCache::new(capacity)),
        }
    }

    /// Return the book `id`, fetching and caching it on a miss.
    pub async fn get_book(&self, id: &str) -> Result<Book, ContentError> {
        let key = id.to_owned();
        let cached = self.lock().get(&key).cloned();
        if let Some(book) = cached {
            trace!(book_id = id, "Book cache hit");
            return Ok(book);
        }

        let book = self.source.fetch_book(id).await?;
        self.lock().set(key, book.clone());
        Ok(book)
    }

    /// Drop every cached book.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached books.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no books are cached.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BoundedCache<String, Book>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for BookCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookCache")
            .field("cached", &self.len())
            .finish_non_exhaustive()
    }
}
