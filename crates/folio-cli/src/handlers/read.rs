//! Read command handler.
//!
//! Turns to a page, prints it, and optionally reads it aloud.

use std::time::Duration;

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::speak::{report, speak_aloud};
use crate::presentation::{format_duration, print_separator};

/// Execute the read command.
///
/// # Errors
///
/// Fails if the book or page does not exist or cannot be read.
pub async fn execute(ctx: &CliContext, book: &str, page: u32, speak: bool) -> Result<()> {
    let view = ctx
        .reader()
        .change_page(book, page)
        .await
        .map_err(CliError::from)?;

    println!("{} by {}", view.book.title, view.book.author);
    println!(
        "Page {} of {}, about {} to read",
        page + 1,
        view.book.pages,
        format_duration(Duration::from_secs(view.reading_seconds))
    );
    print_separator(72);
    println!("{}", view.chunk.text);
    print_separator(72);

    if speak {
        let outcome = speak_aloud(ctx, &view.chunk.text).await?;
        report(outcome);
    }
    Ok(())
}
