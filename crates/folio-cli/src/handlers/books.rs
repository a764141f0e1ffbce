//! Library listing and book metadata handlers.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{print_separator, truncate_string};

/// List every book in the library.
pub async fn list(ctx: &CliContext) -> Result<()> {
    let ids = ctx.library().list_books().await.map_err(|e| CliError::Io(e.to_string()))?;

    if ids.is_empty() {
        println!(
            "No books found in {}.",
            ctx.library().root().display()
        );
        println!("Add a directory with a book.json and numbered page files (0.txt, 1.txt, ...).");
        return Ok(());
    }

    println!("Found {} book(s):\n", ids.len());
    println!("{:<20} {:<32} {:<24} Pages", "ID", "Title", "Author");
    print_separator(84);

    for id in ids {
        match ctx.reader().get_book(&id).await {
            Ok(book) => println!(
                "{:<20} {:<32} {:<24} {}",
                truncate_string(&book.id, 19),
                truncate_string(&book.title, 31),
                truncate_string(&book.author, 23),
                book.pages
            ),
            Err(e) => println!("{:<20} (unreadable: {e})", truncate_string(&id, 19)),
        }
    }
    Ok(())
}

/// Show metadata for one book.
pub async fn show(ctx: &CliContext, id: &str) -> Result<()> {
    let book = ctx.reader().get_book(id).await.map_err(CliError::from)?;

    println!("{}", book.title);
    println!("  Author: {}", book.author);
    println!("  Pages:  {}", book.pages);
    if let Some(cover) = &book.cover_url {
        println!("  Cover:  {cover}");
    }
    if !book.description.is_empty() {
        println!();
        println!("{}", book.description);
    }
    Ok(())
}
