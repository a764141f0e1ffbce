//! Command handlers that delegate to `ReaderService`.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that validate CLI input, call the reader service and
//!   format output for the terminal

pub mod books;
pub mod config;
pub mod estimate;
pub mod read;
pub mod speak;
pub mod transform;
pub mod voices;
