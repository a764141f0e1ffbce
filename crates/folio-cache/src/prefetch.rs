//! Chunk cache with read-ahead.
//!
//! [`PrefetchCoordinator`] owns the chunk cache and the in-flight set. It
//! answers direct chunk requests and warms the chunks after the current page
//! in the background.
//!
//! # Concurrency
//!
//! - The cache and the in-flight set are each behind their own mutex. Neither
//!   lock is ever held across an `.await`.
//! - A prefetch marks its key in flight *before* its fetch future is polled,
//!   so a second prefetch for the same key sees it and backs off.
//! - The in-flight marker is released only after the fetched chunk has been
//!   written to the cache. A waiter woken by the release finds the chunk.
//! - A direct fetch that finds its key in flight waits for settlement up to
//!   the configured budget, then fetches on its own.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use folio_core::{
    Chunk, ChunkKey, ContentError, ContentSource, DiagnosticSink, Settings, SettingsError,
};

use crate::bounded::BoundedCache;
use crate::in_flight::{InFlightGuard, InFlightSet};

/// Tunables for a [`PrefetchCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchConfig {
    /// Maximum number of cached chunks.
    pub capacity: NonZeroUsize,

    /// How long a direct fetch waits on an in-flight prefetch of its key.
    pub wait_budget: Duration,
}

impl PrefetchConfig {
    /// Derive the coordinator tunables from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        let capacity = NonZeroUsize::new(settings.chunk_cache_capacity).ok_or(
            SettingsError::InvalidCacheCapacity {
                name: "chunks",
                value: settings.chunk_cache_capacity,
            },
        )?;
        Ok(Self {
            capacity,
            wait_budget: settings.prefetch_wait_budget(),
        })
    }
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            capacity: NonZeroUsize::new(settings.chunk_cache_capacity).unwrap_or(NonZeroUsize::MIN),
            wait_budget: settings.prefetch_wait_budget(),
        }
    }
}

/// What a prefetch call did. Fetch failures are not part of it; they go to
/// the diagnostic sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchSummary {
    /// Fetches this call dispatched.
    pub dispatched: u32,

    /// Keys skipped because they were already cached or in flight.
    pub skipped: u32,
}

/// Chunk cache plus read-ahead coordination.
pub struct PrefetchCoordinator {
    source: Arc<dyn ContentSource>,
    diagnostics: Arc<dyn DiagnosticSink>,
    cache: Mutex<BoundedCache<ChunkKey, Chunk>>,
    in_flight: InFlightSet,
    wait_budget: Duration,
}

impl PrefetchCoordinator {
    /// Create a coordinator over `source`, reporting prefetch failures to
    /// `diagnostics`.
    pub fn new(
        source: Arc<dyn ContentSource>,
        diagnostics: Arc<dyn DiagnosticSink>,
        config: PrefetchConfig,
    ) -> Self {
        Self {
            source,
            diagnostics,
            cache: Mutex::new(BoundedCache::new(config.capacity)),
            in_flight: InFlightSet::new(),
            wait_budget: config.wait_budget,
        }
    }

    // ── Direct fetch ───────────────────────────────────────────────────

    /// Return chunk `index` of `content_id`.
    ///
    /// Serves from cache when possible. If the chunk is being prefetched, waits
    /// for that prefetch up to the wait budget. Otherwise (or after the budget
    /// runs out) fetches from the source and caches the result.
    ///
    /// The direct path does not mark its key in flight, so two direct fetches
    /// of an uncached key both reach the source.
    pub async fn fetch_chunk(&self, content_id: &str, index: u32) -> Result<Chunk, ContentError> {
        let key = ChunkKey::new(content_id, index);

        if let Some(chunk) = self.cached(&key) {
            trace!(%key, "Chunk cache hit");
            return Ok(chunk);
        }

        if let Some(mut settled) = self.in_flight.subscribe(&key) {
            debug!(%key, budget = ?self.wait_budget, "Waiting on in-flight prefetch");
            // Only the sender being dropped ever resolves `changed()`.
            if tokio::time::timeout(self.wait_budget, settled.changed())
                .await
                .is_ok()
            {
                if let Some(chunk) = self.cached(&key) {
                    trace!(%key, "Served by in-flight prefetch");
                    return Ok(chunk);
                }
                debug!(%key, "In-flight prefetch settled without a chunk");
            } else {
                debug!(%key, "In-flight prefetch still pending, fetching directly");
            }
        }

        let chunk = self.source.fetch_chunk(&key).await?;
        self.store(chunk.clone());
        Ok(chunk)
    }

    // ── Read-ahead ─────────────────────────────────────────────────────

    /// Warm the `count` chunks after `from_index`.
    ///
    /// Keys already cached or in flight are skipped. The remaining fetches run
    /// concurrently; each successful one is cached and each failure is handed
    /// to the diagnostic sink. Nothing is reported to the caller beyond what
    /// was dispatched.
    pub async fn prefetch(&self, content_id: &str, from_index: u32, count: u32) -> PrefetchSummary {
        let origin = ChunkKey::new(content_id, from_index);
        let mut summary = PrefetchSummary::default();
        let mut pending = Vec::new();

        for offset in 1..=count {
            let Some(key) = origin.offset(offset) else {
                break;
            };

            if self.is_cached(&key) {
                summary.skipped += 1;
                continue;
            }

            // Marked in flight here, before the fetch future is ever polled.
            let Some(guard) = self.in_flight.try_begin(&key) else {
                summary.skipped += 1;
                continue;
            };

            // Another task may have cached it between the two checks.
            if self.is_cached(&key) {
                summary.skipped += 1;
                continue;
            }

            summary.dispatched += 1;
            pending.push(self.prefetch_one(guard));
        }

        if !pending.is_empty() {
            debug!(
                content_id,
                from_index,
                dispatched = summary.dispatched,
                skipped = summary.skipped,
                "Prefetching chunks"
            );
            join_all(pending).await;
        }

        summary
    }

    /// Run [`prefetch`](Self::prefetch) on a background task.
    pub fn spawn_prefetch(
        self: &Arc<Self>,
        content_id: impl Into<String>,
        from_index: u32,
        count: u32,
    ) -> JoinHandle<PrefetchSummary> {
        let this = Arc::clone(self);
        let content_id = content_id.into();
        tokio::spawn(async move { this.prefetch(&content_id, from_index, count).await })
    }

    async fn prefetch_one(&self, guard: InFlightGuard<'_>) {
        let key = guard.key();
        match self.source.fetch_chunk(key).await {
            Ok(chunk) => {
                trace!(%key, "Prefetched chunk");
                self.store(chunk);
            }
            Err(e) => {
                self.diagnostics
                    .warn(&format!("Failed to prefetch chunk {key}: {e}"));
            }
        }
        // `guard` drops here, after the cache write.
    }

    // ── Cache management ───────────────────────────────────────────────

    /// Drop every cached chunk. In-flight prefetches are left alone; they
    /// repopulate the cache when they complete.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
        debug!("Chunk cache cleared");
    }

    /// Whether `key` is cached. Does not touch recency.
    pub fn is_cached(&self, key: &ChunkKey) -> bool {
        self.lock_cache().has(key)
    }

    /// Whether `key` is being prefetched.
    pub fn is_in_flight(&self, key: &ChunkKey) -> bool {
        self.in_flight.contains(key)
    }

    /// Number of prefetches currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Number of cached chunks.
    pub fn cached_count(&self) -> usize {
        self.lock_cache().len()
    }

    fn cached(&self, key: &ChunkKey) -> Option<Chunk> {
        self.lock_cache().get(key).cloned()
    }

    fn store(&self, chunk: Chunk) {
        let evicted = self.lock_cache().set(chunk.key.clone(), chunk);
        if let Some(evicted) = evicted {
            trace!(%evicted, "Evicted chunk");
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, BoundedCache<ChunkKey, Chunk>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PrefetchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefetchCoordinator")
            .field("cached", &self.cached_count())
            .field("in_flight", &self.in_flight_count())
            .field("wait_budget", &self.wait_budget)
            .finish_non_exhaustive()
    }
}
