//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter. The concrete ports are instantiated here:
//! - Content source (library directory)
//! - Speech engine (simulated)
//! - Preference store (JSON file)
//! - Diagnostics (tracing)
//!
//! Command handlers receive the composed `ReaderService` and delegate to it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use folio_core::{Settings, TracingDiagnostics, validate_settings};
use folio_reader::{ReaderDeps, ReaderService};
use folio_voice::PlaybackEvent;

use crate::adapters::{DirectoryContentSource, JsonFilePreferences, SimulatedSpeechEngine};
use crate::error::CliError;
use crate::parser::Cli;

/// Resolved locations for one CLI invocation.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Library directory with one sub-directory per book.
    pub library_dir: PathBuf,
    /// Optional JSON settings file.
    pub settings_path: Option<PathBuf>,
    /// Preference file for audio settings.
    pub preferences_path: PathBuf,
}

impl CliConfig {
    /// Resolve paths from flags and environment, falling back to platform
    /// directories.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let library_dir = match &cli.library_dir {
            Some(dir) => dir.clone(),
            None => default_library_dir()?,
        };
        let preferences_path = match &cli.preferences {
            Some(path) => path.clone(),
            None => JsonFilePreferences::default_path().ok_or_else(|| {
                CliError::Config("Could not determine a config directory; pass --preferences".into())
            })?,
        };
        Ok(Self {
            library_dir,
            settings_path: cli.config.clone(),
            preferences_path,
        })
    }
}

/// `<data_dir>/folio/library`.
fn default_library_dir() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("folio").join("library"))
        .ok_or_else(|| {
            CliError::Config("Could not determine a data directory; pass --library-dir".into())
        })
}

/// Load and validate settings from `path`, or defaults when `None`.
pub async fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let settings = match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
            serde_json::from_str(&raw)
                .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?
        }
        None => Settings::default(),
    };
    validate_settings(&settings).map_err(|e| CliError::Config(e.to_string()))?;
    Ok(settings)
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// The reader facade.
    pub reader: Arc<ReaderService>,
    /// The library, for listing books.
    pub library: Arc<DirectoryContentSource>,
    /// Playback events; one speaking handler drains them at a time.
    pub events: Mutex<mpsc::UnboundedReceiver<PlaybackEvent>>,
    /// Resolved paths.
    pub config: CliConfig,
}

impl CliContext {
    pub fn reader(&self) -> &ReaderService {
        &self.reader
    }

    pub fn library(&self) -> &DirectoryContentSource {
        &self.library
    }
}

/// Bootstrap the CLI application.
///
/// Loads settings, builds the adapters and composes the reader service.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let settings = load_settings(config.settings_path.as_deref()).await?;

    let library = Arc::new(DirectoryContentSource::new(&config.library_dir));
    let deps = ReaderDeps {
        content: Arc::clone(&library) as _,
        engine: Arc::new(SimulatedSpeechEngine::new(settings.seconds_per_char)),
        preferences: Arc::new(JsonFilePreferences::new(&config.preferences_path)),
        diagnostics: Arc::new(TracingDiagnostics::new()),
    };
    let (reader, events) = ReaderService::new(deps, settings)?;

    debug!(
        library = %config.library_dir.display(),
        preferences = %config.preferences_path.display(),
        "CLI context ready"
    );

    Ok(CliContext {
        reader: Arc::new(reader),
        library,
        events: Mutex::new(events),
        config,
    })
}
