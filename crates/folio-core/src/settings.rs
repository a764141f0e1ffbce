//! Settings domain types and validation.
//!
//! Every tunable of the cache and playback subsystems lives here. These are
//! pure domain types; loading them from disk is the CLI's job.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of page chunks kept in memory.
pub const DEFAULT_CHUNK_CACHE_CAPACITY: usize = 50;

/// Default number of book metadata records kept in memory.
pub const DEFAULT_BOOK_CACHE_CAPACITY: usize = 20;

/// Default number of chunks warmed ahead of the current page.
pub const DEFAULT_PREFETCH_COUNT: u32 = 3;

/// Upper bound for either cache capacity.
const MAX_CACHE_CAPACITY: usize = 10_000;

/// Upper bound for the prefetch window.
const MAX_PREFETCH_COUNT: u32 = 50;

/// Application settings.
///
/// Missing fields in a config file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Capacity of the page chunk cache.
    pub chunk_cache_capacity: usize,

    /// Capacity of the book metadata cache.
    pub book_cache_capacity: usize,

    /// How many chunks a page change warms ahead.
    pub prefetch_count: u32,

    /// How many wait intervals a direct fetch spends on an in-flight prefetch
    /// of the same chunk before fetching it itself.
    pub prefetch_wait_attempts: u32,

    /// Length of one wait interval, in milliseconds.
    pub prefetch_wait_interval_ms: u64,

    /// Period of the playback progress ticker, in milliseconds.
    pub progress_tick_ms: u64,

    /// Estimated speaking time per character at rate 1.0, in seconds.
    pub seconds_per_char: f64,

    /// Reading speed used for page duration estimates.
    pub words_per_minute: u32,

    /// Voices scoring below this are hidden from voice pickers.
    pub min_voice_score: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_cache_capacity: DEFAULT_CHUNK_CACHE_CAPACITY,
            book_cache_capacity: DEFAULT_BOOK_CACHE_CAPACITY,
            prefetch_count: DEFAULT_PREFETCH_COUNT,
            prefetch_wait_attempts: 10,
            prefetch_wait_interval_ms: 100,
            progress_tick_ms: 100,
            seconds_per_char: 0.06,
            words_per_minute: 200,
            min_voice_score: 2,
        }
    }
}

impl Settings {
    /// One prefetch wait interval.
    pub const fn prefetch_wait_interval(&self) -> Duration {
        Duration::from_millis(self.prefetch_wait_interval_ms)
    }

    /// Total time a direct fetch will wait on an in-flight prefetch.
    pub fn prefetch_wait_budget(&self) -> Duration {
        self.prefetch_wait_interval() * self.prefetch_wait_attempts
    }

    /// Progress ticker period.
    pub const fn progress_tick(&self) -> Duration {
        Duration::from_millis(self.progress_tick_ms)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("Cache capacity for {name} must be between 1 and 10000, got {value}")]
    InvalidCacheCapacity { name: &'static str, value: usize },

    #[error("Prefetch count must be at most 50, got {0}")]
    InvalidPrefetchCount(u32),

    #[error("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },

    #[error("Seconds per character must be a positive number, got {0}")]
    InvalidSecondsPerChar(f64),

    #[error("Words per minute must be greater than zero")]
    ZeroWordsPerMinute,
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    for (name, value) in [
        ("chunks", settings.chunk_cache_capacity),
        ("books", settings.book_cache_capacity),
    ] {
        if value == 0 || value > MAX_CACHE_CAPACITY {
            return Err(SettingsError::InvalidCacheCapacity { name, value });
        }
    }

    if settings.prefetch_count > MAX_PREFETCH_COUNT {
        return Err(SettingsError::InvalidPrefetchCount(settings.prefetch_count));
    }

    if settings.prefetch_wait_interval_ms == 0 {
        return Err(SettingsError::ZeroInterval {
            name: "Prefetch wait interval",
        });
    }

    if settings.progress_tick_ms == 0 {
        return Err(SettingsError::ZeroInterval {
            name: "Progress tick",
        });
    }

    if !settings.seconds_per_char.is_finite() || settings.seconds_per_char <= 0.0 {
        return Err(SettingsError::InvalidSecondsPerChar(settings.seconds_per_char));
    }

    if settings.words_per_minute == 0 {
        return Err(SettingsError::ZeroWordsPerMinute);
    }

    Ok(())
}
