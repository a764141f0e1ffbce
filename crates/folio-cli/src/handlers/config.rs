//! Config command handler.
//!
//! Shows resolved paths and settings, and manages audio preferences.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::commands::{AudioArgs, ConfigCommand};
use crate::error::CliError;

/// Execute the config command.
pub async fn execute(ctx: &CliContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => handle_show(ctx),
        ConfigCommand::Settings => {
            println!("{}", serde_json::to_string_pretty(ctx.reader().settings())?);
            Ok(())
        }
        ConfigCommand::Audio(args) => handle_audio(ctx, args).await,
    }
}

fn handle_show(ctx: &CliContext) -> Result<()> {
    let config = &ctx.config;
    let settings = ctx.reader().settings();

    println!("Library:      {}", config.library_dir.display());
    println!("Preferences:  {}", config.preferences_path.display());
    match &config.settings_path {
        Some(path) => println!("Settings:     {}", path.display()),
        None => println!("Settings:     (defaults)"),
    }
    println!();
    println!("Page cache:   {} chunks", settings.chunk_cache_capacity);
    println!("Book cache:   {} books", settings.book_cache_capacity);
    println!("Read-ahead:   {} pages", settings.prefetch_count);
    println!(
        "Wait budget:  {} x {} ms",
        settings.prefetch_wait_attempts, settings.prefetch_wait_interval_ms
    );
    println!("Reading pace: {} wpm", settings.words_per_minute);
    Ok(())
}

async fn handle_audio(ctx: &CliContext, args: AudioArgs) -> Result<()> {
    let reader = ctx.reader();
    let mut params = reader.audio_settings().await.map_err(CliError::from)?;

    if args.is_update() {
        if args.default_voice {
            params.voice = None;
        }
        if let Some(voice) = args.voice {
            params.voice = Some(voice);
        }
        if let Some(rate) = args.rate {
            params.rate = rate;
        }
        if let Some(pitch) = args.pitch {
            params.pitch = pitch;
        }
        if let Some(volume) = args.volume {
            params.volume = volume;
        }
        reader
            .update_audio_settings(&params)
            .await
            .map_err(CliError::from)?;
        println!("✓ Audio settings updated.");
    }

    println!("Voice:  {}", params.voice.as_deref().unwrap_or("(engine default)"));
    println!("Rate:   {:.2}", params.rate);
    println!("Pitch:  {:.2}", params.pitch);
    println!("Volume: {:.2}", params.volume);
    Ok(())
}
