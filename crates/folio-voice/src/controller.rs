//! Playback controller: owns the single active speech session.
//!
//! ```text
//!   Idle ──speak──▶ Speaking ──engine end──▶ Idle        (Ended)
//!                     │  ▲
//!                pause│  │resume
//!                     ▼  │
//!                    Paused
//!   Speaking/Paused ──stop or new speak──▶ Idle/Speaking (Cancelled)
//! ```
//!
//! At most one session exists. Starting a session replaces the previous one;
//! the replaced session is cancelled (engine `cancel()` exactly once) and its
//! `speak` call resolves to [`SessionOutcome::Cancelled`].
//!
//! Whoever removes a session from the slot emits its terminal event: the
//! canceller emits `Cancelled`, the session's own run loop emits `Ended` or
//! `Error`. Each session therefore gets exactly one terminal event.
//!
//! Engine submissions are serialized. A session cancelled while its
//! utterance was being submitted cancels that utterance itself before the
//! next session may submit, so the engine never keeps speaking text that no
//! session owns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use folio_core::{
    EngineError, EngineEvent, Settings, SpeechEngine, SpeechRequest, VoiceParams, WordBoundary,
};

use crate::error::PlaybackError;
use crate::estimate::estimate_speaking_duration;
use crate::transform::TextTransformPipeline;

// ── Session identity and state ─────────────────────────────────────

/// Identifies one speech session. Ids increase monotonically per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No session.
    Idle,

    /// A session is speaking.
    Speaking,

    /// A session exists but the engine is paused.
    Paused,
}

/// How a `speak` call ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The engine finished the utterance.
    Ended,

    /// The session was stopped or replaced by a newer one.
    Cancelled,
}

/// Snapshot of the active session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub started_at: DateTime<Utc>,
    /// Controller-side duration estimate, used when the engine has no timing
    /// of its own.
    pub estimated_duration: Duration,
    /// Number of highlightable tokens.
    pub token_count: usize,
}

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted by the controller to the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Controller state changed.
    StateChanged(PlaybackState),

    /// The engine reached token `index` of the session.
    WordBoundary {
        session: SessionId,
        index: usize,
        boundary: WordBoundary,
    },

    /// Estimated progress, for engines without native timing.
    Progress {
        session: SessionId,
        elapsed: Duration,
        estimated: Duration,
    },

    /// The engine finished the session's utterance.
    Ended { session: SessionId },

    /// The session was stopped or replaced.
    Cancelled { session: SessionId },

    /// The engine failed the session.
    Error { session: SessionId, message: String },
}

// ── Configuration ──────────────────────────────────────────────────

/// Tunables for a [`PlaybackController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Period of the progress ticker.
    pub progress_tick: Duration,

    /// Estimated speaking time per character at rate 1.0, in seconds.
    pub seconds_per_char: f64,
}

impl PlaybackConfig {
    pub const fn from_settings(settings: &Settings) -> Self {
        Self {
            progress_tick: settings.progress_tick(),
            seconds_per_char: settings.seconds_per_char,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

// ── Controller ─────────────────────────────────────────────────────

struct ActiveSession {
    info: SessionInfo,
    cancel: CancellationToken,
}

struct Slot {
    session: Option<ActiveSession>,
    state: PlaybackState,
}

/// Drives a [`SpeechEngine`] one session at a time and republishes its
/// progress as [`PlaybackEvent`]s.
pub struct PlaybackController {
    engine: Arc<dyn SpeechEngine>,
    pipeline: TextTransformPipeline,
    config: PlaybackConfig,
    slot: Mutex<Slot>,
    submit_lock: tokio::sync::Mutex<()>,
    next_id: AtomicU64,
    event_tx: mpsc::UnboundedSender<PlaybackEvent>,
}

impl PlaybackController {
    /// Create a controller.
    ///
    /// Returns the controller and a receiver for [`PlaybackEvent`]s.
    #[must_use]
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        pipeline: TextTransformPipeline,
        config: PlaybackConfig,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let controller = Self {
            engine,
            pipeline,
            config,
            slot: Mutex::new(Slot {
                session: None,
                state: PlaybackState::Idle,
            }),
            submit_lock: tokio::sync::Mutex::new(()),
            next_id: AtomicU64::new(0),
            event_tx,
        };
        (controller, event_rx)
    }

    pub fn state(&self) -> PlaybackState {
        self.lock().state
    }

    pub fn is_paused(&self) -> bool {
        self.state() == PlaybackState::Paused
    }

    /// The active session, if any.
    pub fn current_session(&self) -> Option<SessionInfo> {
        self.lock().session.as_ref().map(|s| s.info.clone())
    }

    /// The pipeline used to prepare text.
    pub const fn pipeline(&self) -> &TextTransformPipeline {
        &self.pipeline
    }

    // ── Speaking ───────────────────────────────────────────────────

    /// Speak `text` with `base` voice parameters, replacing any active
    /// session.
    ///
    /// Resolves when the session ends: `Ended` when the engine finishes,
    /// `Cancelled` when the session is stopped or replaced, or an error when
    /// the engine fails (the controller is idle again by then).
    ///
    /// Text with no speakable tokens stops the active session and resolves
    /// `Ended` without contacting the engine.
    pub async fn speak(
        &self,
        text: &str,
        base: &VoiceParams,
    ) -> Result<SessionOutcome, PlaybackError> {
        let transformed = self.pipeline.transform(text);
        if transformed.tokens.is_empty() {
            debug!("Nothing to speak");
            self.stop();
            return Ok(SessionOutcome::Ended);
        }

        let params = transformed.spoken_params(base);
        let estimate = estimate_speaking_duration(
            &transformed.speech_text,
            self.config.seconds_per_char,
            params.rate,
        );
        let (id, cancel) = self.begin_session(transformed.tokens.len(), estimate);

        debug!(
            session = %id,
            tokens = transformed.tokens.len(),
            emotion = ?transformed.expressive.emotion,
            "Speaking"
        );

        // Cancels the session if this future is dropped before it settles.
        let mut abandon = AbandonGuard {
            controller: self,
            id,
            armed: true,
        };

        let request = SpeechRequest {
            text: transformed.marked_text.clone(),
            params,
        };
        let result = match self.submit(id, &cancel, request).await {
            Some(Ok(events)) => {
                self.drive(id, &cancel, events, &transformed.tokens, estimate)
                    .await
            }
            Some(Err(e)) => Some(Err(e)),
            None => None,
        };
        abandon.disarm();

        match result {
            Some(result) => self.finish(id, result),
            None => Ok(SessionOutcome::Cancelled),
        }
    }

    /// Stop the active session. Idempotent: the engine is only cancelled when
    /// a session exists.
    pub fn stop(&self) {
        let mut slot = self.lock();
        let Some(session) = slot.session.take() else {
            return;
        };
        self.cancel_session(&session);
        self.set_state(&mut slot, PlaybackState::Idle);
    }

    /// Stop session `id` if it is still the active one.
    fn stop_session(&self, id: SessionId) {
        let mut slot = self.lock();
        if slot.session.as_ref().map(|s| s.info.id) != Some(id) {
            return;
        }
        if let Some(session) = slot.session.take() {
            debug!(session = %id, "Speak call dropped, cancelling session");
            self.cancel_session(&session);
        }
        self.set_state(&mut slot, PlaybackState::Idle);
    }

    /// Pause the active session. Returns `false` if there is nothing to pause.
    pub fn pause(&self) -> bool {
        let mut slot = self.lock();
        if slot.state != PlaybackState::Speaking {
            return false;
        }
        self.engine.pause();
        self.set_state(&mut slot, PlaybackState::Paused);
        true
    }

    /// Resume a paused session. Returns `false` if nothing is paused.
    pub fn resume(&self) -> bool {
        let mut slot = self.lock();
        if slot.state != PlaybackState::Paused {
            return false;
        }
        self.engine.resume();
        self.set_state(&mut slot, PlaybackState::Speaking);
        true
    }

    // ── Session lifecycle ──────────────────────────────────────────

    fn begin_session(&self, token_count: usize, estimate: Duration) -> (SessionId, CancellationToken) {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let cancel = CancellationToken::new();
        let session = ActiveSession {
            info: SessionInfo {
                id,
                started_at: Utc::now(),
                estimated_duration: estimate,
                token_count,
            },
            cancel: cancel.clone(),
        };

        let mut slot = self.lock();
        if let Some(previous) = slot.session.replace(session) {
            debug!(previous = %previous.info.id, next = %id, "Replacing active session");
            self.cancel_session(&previous);
        }
        self.set_state(&mut slot, PlaybackState::Speaking);
        (id, cancel)
    }

    /// Hand `request` to the engine while holding the submit lock.
    ///
    /// Returns `None` when the session is cancelled before or during
    /// submission. An utterance the engine accepted after cancellation is
    /// cancelled here, while no newer session can have submitted yet.
    async fn submit(
        &self,
        id: SessionId,
        cancel: &CancellationToken,
        request: SpeechRequest,
    ) -> Option<Result<mpsc::UnboundedReceiver<EngineEvent>, EngineError>> {
        let _submitting = self.submit_lock.lock().await;
        if cancel.is_cancelled() {
            trace!(session = %id, "Cancelled before submission");
            return None;
        }

        let result = self.engine.speak(request).await;
        if !cancel.is_cancelled() {
            return Some(result);
        }
        if result.is_ok() {
            debug!(session = %id, "Cancelled during submission, cancelling utterance");
            self.engine.cancel();
        }
        None
    }

    /// Run the session until the engine ends it or it is cancelled.
    ///
    /// Returns `None` when cancelled.
    async fn drive(
        &self,
        id: SessionId,
        cancel: &CancellationToken,
        mut events: mpsc::UnboundedReceiver<EngineEvent>,
        tokens: &[String],
        estimate: Duration,
    ) -> Option<Result<(), EngineError>> {
        let tick = self.config.progress_tick;
        let mut ticker = tokio::time::interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tracking = !self.engine.has_native_timing() && !estimate.is_zero();
        let mut elapsed = Duration::ZERO;
        let mut cursor = 0;

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => return None,

                event = events.recv() => match event {
                    Some(EngineEvent::WordBoundary { char_index }) => {
                        let Some(word) = tokens.get(cursor) else {
                            trace!(session = %id, char_index, "Boundary past last token dropped");
                            continue;
                        };
                        self.emit(PlaybackEvent::WordBoundary {
                            session: id,
                            index: cursor,
                            boundary: WordBoundary {
                                word: word.clone(),
                                start_offset: char_index,
                                end_offset: char_index + word.chars().count(),
                            },
                        });
                        cursor += 1;
                    }
                    Some(EngineEvent::End) => return Some(Ok(())),
                    Some(EngineEvent::Error(message)) => {
                        return Some(Err(EngineError::Failed(message)));
                    }
                    None => return Some(Err(EngineError::Disconnected)),
                },

                _ = ticker.tick(), if tracking => {
                    if self.is_paused() {
                        continue;
                    }
                    elapsed = (elapsed + tick).min(estimate);
                    self.emit(PlaybackEvent::Progress {
                        session: id,
                        elapsed,
                        estimated: estimate,
                    });
                    tracking = elapsed < estimate;
                }
            }
        }
    }

    /// Settle session `id` with the engine's result, unless it has already
    /// been cancelled.
    fn finish(
        &self,
        id: SessionId,
        result: Result<(), EngineError>,
    ) -> Result<SessionOutcome, PlaybackError> {
        let mut slot = self.lock();
        if slot.session.as_ref().map(|s| s.info.id) != Some(id) {
            return Ok(SessionOutcome::Cancelled);
        }
        slot.session = None;

        let outcome = match result {
            Ok(()) => {
                debug!(session = %id, "Session ended");
                self.emit(PlaybackEvent::Ended { session: id });
                Ok(SessionOutcome::Ended)
            }
            Err(e) => {
                warn!(session = %id, error = %e, "Speech engine failed");
                self.emit(PlaybackEvent::Error {
                    session: id,
                    message: e.to_string(),
                });
                Err(PlaybackError::Engine(e))
            }
        };
        self.set_state(&mut slot, PlaybackState::Idle);
        outcome
    }

    fn cancel_session(&self, session: &ActiveSession) {
        session.cancel.cancel();
        self.engine.cancel();
        self.emit(PlaybackEvent::Cancelled {
            session: session.info.id,
        });
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn set_state(&self, slot: &mut Slot, new_state: PlaybackState) {
        if slot.state != new_state {
            debug!(old = ?slot.state, new = ?new_state, "Playback state transition");
            slot.state = new_state;
            self.emit(PlaybackEvent::StateChanged(new_state));
        }
    }

    /// Emit a playback event (best-effort; a dropped receiver is logged).
    fn emit(&self, event: PlaybackEvent) {
        if self.event_tx.send(event).is_err() {
            trace!("Playback event receiver dropped");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Stops its session when dropped, unless disarmed once the session settles.
struct AbandonGuard<'a> {
    controller: &'a PlaybackController,
    id: SessionId,
    armed: bool,
}

impl AbandonGuard<'_> {
    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.controller.stop_session(self.id);
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.stop();
    }
}
