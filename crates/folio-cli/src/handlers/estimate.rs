//! Estimate command handler.

use std::time::Duration;

use anyhow::Result;

use folio_voice::estimate_speaking_duration;

use crate::bootstrap::CliContext;
use crate::commands::TextInput;
use crate::error::CliError;
use crate::presentation::format_duration;

/// Execute the estimate command.
///
/// Prints the silent reading time and the speaking time at the stored
/// audio rate.
pub async fn execute(ctx: &CliContext, input: TextInput) -> Result<()> {
    let text = input.resolve().await?;
    let reader = ctx.reader();

    let reading = reader.estimate_duration(&text);
    let audio = reader.audio_settings().await.map_err(CliError::from)?;
    let transformed = reader.playback().pipeline().transform(&text);
    let params = transformed.spoken_params(&audio);
    let speaking = estimate_speaking_duration(
        &transformed.speech_text,
        reader.settings().seconds_per_char,
        params.rate,
    );

    println!("Words:    {}", text.split_whitespace().count());
    println!(
        "Reading:  {} at {} wpm",
        format_duration(Duration::from_secs(reading)),
        reader.settings().words_per_minute
    );
    println!(
        "Speaking: {} at rate {:.2}",
        format_duration(speaking),
        params.rate
    );
    Ok(())
}
