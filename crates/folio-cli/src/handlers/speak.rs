//! Speak command handler.
//!
//! Reads text aloud through the reader service and prints each word as the
//! engine reaches it. Ctrl-C stops the session.

use std::io::{self, Write};

use anyhow::Result;
use tracing::debug;

use folio_voice::{PlaybackEvent, SessionOutcome};

use crate::bootstrap::CliContext;
use crate::commands::TextInput;
use crate::error::CliError;

/// Column after which highlighted words wrap.
const WRAP_WIDTH: usize = 72;

/// Execute the speak command.
pub async fn execute(ctx: &CliContext, input: TextInput) -> Result<()> {
    let text = input.resolve().await?;
    let outcome = speak_aloud(ctx, &text).await?;
    report(outcome);
    Ok(())
}

/// Speak `text`, rendering word highlights until the session settles.
pub async fn speak_aloud(ctx: &CliContext, text: &str) -> Result<SessionOutcome, CliError> {
    let mut events = ctx.events.lock().await;
    let mut highlighter = Highlighter::new(io::stdout());

    let speaking = ctx.reader().start_speaking(text);
    tokio::pin!(speaking);
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    let mut interrupted = false;

    let result = loop {
        tokio::select! {
            result = &mut speaking => break result,
            Some(event) = events.recv() => highlighter.render(&event)?,
            _ = &mut interrupt, if !interrupted => {
                interrupted = true;
                debug!("Interrupted, stopping speech");
                ctx.reader().stop_speaking();
            }
        }
    };

    while let Ok(event) = events.try_recv() {
        highlighter.render(&event)?;
    }
    highlighter.finish()?;

    Ok(result?)
}

pub fn report(outcome: SessionOutcome) {
    match outcome {
        SessionOutcome::Ended => println!("✓ Finished reading."),
        SessionOutcome::Cancelled => println!("Stopped."),
    }
}

/// Prints highlighted words as a wrapped running line.
pub struct Highlighter<W: Write> {
    out: W,
    column: usize,
}

impl<W: Write> Highlighter<W> {
    pub const fn new(out: W) -> Self {
        Self { out, column: 0 }
    }

    pub fn render(&mut self, event: &PlaybackEvent) -> io::Result<()> {
        match event {
            PlaybackEvent::WordBoundary { boundary, .. } => {
                let width = boundary.word.chars().count();
                if self.column > 0 && self.column + 1 + width > WRAP_WIDTH {
                    writeln!(self.out)?;
                    self.column = 0;
                }
                if self.column > 0 {
                    write!(self.out, " ")?;
                    self.column += 1;
                }
                write!(self.out, "{}", boundary.word)?;
                self.column += width;
                self.out.flush()
            }
            PlaybackEvent::Error { message, .. } => {
                self.finish()?;
                eprintln!("Speech error: {message}");
                Ok(())
            }
            other => {
                debug!(event = ?other, "Playback event");
                Ok(())
            }
        }
    }

    /// End the current line, if any.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.column > 0 {
            writeln!(self.out)?;
            self.column = 0;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
