//! Duration estimates for reading and speaking.

use std::time::Duration;

/// Whole seconds needed to read `text` at `words_per_minute`, rounded up.
///
/// Words are whitespace-separated tokens. Returns 0 for empty text or a zero
/// reading speed.
pub fn estimate_reading_seconds(text: &str, words_per_minute: u32) -> u64 {
    if words_per_minute == 0 {
        return 0;
    }
    let words = text.split_whitespace().count() as u64;
    // ceil(words / wpm * 60) in integer arithmetic
    (words * 60).div_ceil(u64::from(words_per_minute))
}

/// Estimated time to speak `text` at `rate`.
///
/// `chars × seconds_per_char / rate`. Non-positive or non-finite rates are
/// treated as 1.0.
pub fn estimate_speaking_duration(text: &str, seconds_per_char: f64, rate: f32) -> Duration {
    let rate = if rate.is_finite() && rate > 0.0 {
        f64::from(rate)
    } else {
        1.0
    };
    #[allow(clippy::cast_precision_loss)]
    let chars = text.chars().count() as f64;
    let seconds = chars * seconds_per_char / rate;
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
}
