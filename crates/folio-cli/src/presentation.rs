//! Shared CLI presentation utilities.
//!
//! Format-only helpers; no domain logic.

use std::time::Duration;

/// Truncates a string to at most `max_len` characters, adding "..." if
/// needed.
///
/// # Examples
///
/// ```rust
/// use folio_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// `m:ss` for durations under an hour, `h:mm:ss` otherwise.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use folio_cli::presentation::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(75)), "1:15");
/// assert_eq!(format_duration(Duration::from_secs(3725)), "1:02:05");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
