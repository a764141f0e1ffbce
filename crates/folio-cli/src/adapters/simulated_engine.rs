//! A speech engine that produces no audio.
//!
//! Emits a word boundary at the start of each word on a timer derived from
//! the text length and speaking rate, then `End`. Prosody markup (`<...>`)
//! is skipped when splitting words, the way a real SSML engine would not
//! speak it.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use folio_core::{EngineError, EngineEvent, SpeechEngine, SpeechRequest, VoiceInfo};

/// Voices offered by the simulated engine.
const VOICES: [(&str, &str, bool); 4] = [
    ("Ava (Premium)", "en-US", true),
    ("Daniel (Enhanced)", "en-GB", true),
    ("Samantha", "en-US", false),
    ("Anna", "de-DE", false),
];

struct Utterance {
    cancel: CancellationToken,
    paused: watch::Sender<bool>,
}

/// Timer-driven stand-in for a platform speech engine.
pub struct SimulatedSpeechEngine {
    seconds_per_char: f64,
    current: Mutex<Option<Utterance>>,
}

impl SimulatedSpeechEngine {
    /// `seconds_per_char` is the speaking time of one character at rate 1.0.
    pub fn new(seconds_per_char: f64) -> Self {
        Self {
            seconds_per_char,
            current: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Utterance>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn char_duration(&self, rate: f32) -> Result<Duration, EngineError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(EngineError::Rejected(format!("unsupported rate {rate}")));
        }
        Duration::try_from_secs_f64(self.seconds_per_char / f64::from(rate))
            .map_err(|e| EngineError::Rejected(e.to_string()))
    }
}

#[async_trait]
impl SpeechEngine for SimulatedSpeechEngine {
    async fn speak(
        &self,
        request: SpeechRequest,
    ) -> Result<mpsc::UnboundedReceiver<EngineEvent>, EngineError> {
        if let Some(voice) = &request.params.voice {
            if !VOICES.iter().any(|(name, _, _)| name == voice) {
                return Err(EngineError::Rejected(format!("unknown voice '{voice}'")));
            }
        }
        let char_duration = self.char_duration(request.params.rate)?;
        let words = word_spans(&request.text);

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let (paused_tx, paused_rx) = watch::channel(false);

        if let Some(previous) = self.lock().replace(Utterance {
            cancel: cancel.clone(),
            paused: paused_tx,
        }) {
            previous.cancel.cancel();
        }

        debug!(words = words.len(), rate = request.params.rate, "Simulated utterance started");
        tokio::spawn(run_utterance(words, char_duration, tx, cancel, paused_rx));
        Ok(rx)
    }

    fn cancel(&self) {
        if let Some(utterance) = self.lock().take() {
            utterance.cancel.cancel();
        }
    }

    fn pause(&self) {
        if let Some(utterance) = self.lock().as_ref() {
            utterance.paused.send_replace(true);
        }
    }

    fn resume(&self) {
        if let Some(utterance) = self.lock().as_ref() {
            utterance.paused.send_replace(false);
        }
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        VOICES
            .iter()
            .map(|(name, lang, local)| VoiceInfo::new(*name, *lang, *local))
            .collect()
    }

    fn has_native_timing(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for SimulatedSpeechEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedSpeechEngine")
            .field("seconds_per_char", &self.seconds_per_char)
            .field("speaking", &self.lock().is_some())
            .finish()
    }
}

async fn run_utterance(
    words: Vec<(usize, usize)>,
    char_duration: Duration,
    tx: mpsc::UnboundedSender<EngineEvent>,
    cancel: CancellationToken,
    mut paused: watch::Receiver<bool>,
) {
    for (char_index, len) in words {
        tokio::select! {
            () = cancel.cancelled() => return,
            running = paused.wait_for(|p| !*p) => {
                if running.is_err() {
                    return;
                }
            }
        }

        trace!(char_index, "Simulated word boundary");
        if tx.send(EngineEvent::WordBoundary { char_index }).is_err() {
            return;
        }

        // One extra character for the trailing space.
        #[allow(clippy::cast_possible_truncation)]
        let pause = char_duration * (len as u32 + 1);
        tokio::select! {
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(pause) => {}
        }
    }
    let _ = tx.send(EngineEvent::End);
}

/// `(char_index, char_len)` of every spoken word, skipping `<...>` markup.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut in_tag = false;
    let mut current: Option<(usize, usize)> = None;

    for (index, c) in text.chars().enumerate() {
        let is_word_char = match c {
            '<' => {
                in_tag = true;
                false
            }
            '>' if in_tag => {
                in_tag = false;
                false
            }
            _ => !in_tag && !c.is_whitespace(),
        };

        if !is_word_char {
            spans.extend(current.take());
        } else if let Some((_, len)) = current.as_mut() {
            *len += 1;
        } else {
            current = Some((index, 1));
        }
    }
    spans.extend(current);
    spans
}
