//! Transform command handler.
//!
//! Shows what the speech pipeline does to a piece of text.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Execute the transform command.
pub fn execute(ctx: &CliContext, text: &str, json: bool) -> Result<()> {
    let pipeline = ctx.reader().playback().pipeline();
    let transformed = pipeline.transform(text);

    if json {
        println!("{}", serde_json::to_string_pretty(&transformed)?);
        return Ok(());
    }

    let expressive = &transformed.expressive;
    println!("Rules:       {}", pipeline.rules_version());
    println!("Speech text: {}", transformed.speech_text);
    println!("Marked text: {}", transformed.marked_text);
    println!("Tokens:      {}", transformed.tokens.len());
    println!(
        "Emotion:     {} (pitch x{:.2}, rate x{:.2}, volume x{:.2})",
        expressive.emotion.as_deref().unwrap_or("neutral"),
        expressive.pitch_factor,
        expressive.rate_factor,
        expressive.volume_factor
    );
    Ok(())
}
