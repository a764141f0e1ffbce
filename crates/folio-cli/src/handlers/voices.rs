//! Voices command handler.

use anyhow::Result;

use folio_voice::score_voice;

use crate::bootstrap::CliContext;
use crate::presentation::{print_separator, truncate_string};

/// Execute the voices command.
///
/// By default shows the ranked voices a picker would offer; `all` lists
/// every engine voice with its score instead.
pub async fn execute(ctx: &CliContext, all: bool) -> Result<()> {
    let reader = ctx.reader();
    let voices = if all {
        let mut voices = reader.all_voices();
        voices.sort_by_key(|v| std::cmp::Reverse(score_voice(v)));
        voices
    } else {
        reader.voices()
    };

    if voices.is_empty() {
        println!("No voices available.");
        return Ok(());
    }

    let selected = reader
        .audio_settings()
        .await
        .ok()
        .and_then(|params| params.voice);

    println!("{:<2} {:<28} {:<8} {:<7} Score", "", "Name", "Lang", "Local");
    print_separator(54);
    for voice in &voices {
        let marker = if selected.as_deref() == Some(voice.name.as_str()) {
            "*"
        } else {
            ""
        };
        println!(
            "{:<2} {:<28} {:<8} {:<7} {}",
            marker,
            truncate_string(&voice.name, 27),
            voice.lang,
            if voice.local_service { "yes" } else { "no" },
            score_voice(voice)
        );
    }
    Ok(())
}
