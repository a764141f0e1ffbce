//! Subcommand definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::error::CliError;

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Open a book at a page and warm the following pages
    Read {
        /// Book id (directory name in the library)
        book: String,

        /// Zero-based page index
        #[arg(short, long, default_value_t = 0)]
        page: u32,

        /// Read the page aloud with word highlighting
        #[arg(long)]
        speak: bool,
    },

    /// Read text aloud with word highlighting
    Speak(TextInput),

    /// Show how text is rewritten for speech
    Transform {
        /// Text to transform
        text: String,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate reading and speaking time
    Estimate(TextInput),

    /// List voices offered by the speech engine
    Voices {
        /// Include low-quality voices, with their scores
        #[arg(long)]
        all: bool,
    },

    /// List books in the library
    Books,

    /// Show metadata for one book
    Book {
        /// Book id
        id: String,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// `config` subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show resolved paths and settings
    Show,

    /// Print the effective settings as JSON
    Settings,

    /// Show audio settings, or update them when any flag is given
    Audio(AudioArgs),
}

/// Audio settings overrides.
#[derive(Args, Debug, Default)]
pub struct AudioArgs {
    /// Preferred voice name
    #[arg(long, conflicts_with = "default_voice")]
    pub voice: Option<String>,

    /// Use the engine's default voice
    #[arg(long)]
    pub default_voice: bool,

    /// Speaking rate (0.1 to 10)
    #[arg(long)]
    pub rate: Option<f32>,

    /// Pitch (0 to 2)
    #[arg(long)]
    pub pitch: Option<f32>,

    /// Volume (0 to 1)
    #[arg(long)]
    pub volume: Option<f32>,
}

impl AudioArgs {
    pub const fn is_update(&self) -> bool {
        self.voice.is_some()
            || self.default_voice
            || self.rate.is_some()
            || self.pitch.is_some()
            || self.volume.is_some()
    }
}

/// Text given inline or read from a file.
#[derive(Args, Debug)]
pub struct TextInput {
    /// Inline text
    pub text: Option<String>,

    /// Read the text from a file instead
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
}

impl TextInput {
    /// The text to work on.
    pub async fn resolve(self) -> Result<String, CliError> {
        match (self.text, self.file) {
            (Some(text), _) => Ok(text),
            (None, Some(path)) => Ok(tokio::fs::read_to_string(&path).await?),
            (None, None) => Err(CliError::Arguments(
                "provide TEXT or --file <FILE>".to_string(),
            )),
        }
    }
}
