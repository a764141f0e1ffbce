//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the folio reader.
#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Read books from a local library, optionally aloud")]
#[command(version)]
pub struct Cli {
    /// Library directory holding one sub-directory per book
    #[arg(long = "library-dir", env = "FOLIO_LIBRARY_DIR", global = true)]
    pub library_dir: Option<PathBuf>,

    /// JSON settings file; missing fields keep their defaults
    #[arg(long = "config", env = "FOLIO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Preference file for audio settings
    #[arg(long = "preferences", env = "FOLIO_PREFERENCES", global = true)]
    pub preferences: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ConfigCommand;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["folio", "--verbose", "--library-dir", "/tmp/books", "books"]);
        assert!(cli.verbose);
        assert_eq!(cli.library_dir, Some(PathBuf::from("/tmp/books")));
        assert!(matches!(cli.command, Some(Commands::Books)));
    }

    #[test]
    fn test_read_defaults_to_first_page() {
        let cli = Cli::parse_from(["folio", "read", "moby"]);
        let Some(Commands::Read { book, page, speak }) = cli.command else {
            panic!("expected read");
        };
        assert_eq!(book, "moby");
        assert_eq!(page, 0);
        assert!(!speak);
    }

    #[test]
    fn test_text_and_file_conflict() {
        let result = Cli::try_parse_from(["folio", "speak", "hello", "--file", "page.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_audio_flags() {
        let cli = Cli::parse_from(["folio", "config", "audio", "--rate", "1.5", "--voice", "Ava"]);
        let Some(Commands::Config {
            command: ConfigCommand::Audio(args),
        }) = cli.command
        else {
            panic!("expected config audio");
        };
        assert_eq!(args.rate, Some(1.5));
        assert_eq!(args.voice.as_deref(), Some("Ava"));
        assert!(args.pitch.is_none());
    }
}
