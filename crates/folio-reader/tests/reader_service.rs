//! Integration tests for `ReaderService` against in-memory ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use folio_core::{
    Book, Chunk, ChunkKey, ContentError, ContentSource, EngineError, EngineEvent,
    InMemoryPreferences, NoopDiagnostics, PreferenceStore, Settings, SpeechEngine, SpeechRequest,
    VoiceInfo, VoiceParams,
};
use folio_reader::{AUDIO_SETTINGS_KEY, PlayOutcome, ReaderDeps, ReaderError, ReaderService};
use folio_voice::{PlaybackEvent, SessionOutcome};
use tokio::sync::mpsc;

// ── Mocks ──────────────────────────────────────────────────────────

/// One book, "moby", with `pages` pages of text.
struct Library {
    pages: u32,
    chunk_calls: Mutex<HashMap<u32, u32>>,
    book_calls: AtomicU32,
}

impl Library {
    fn new(pages: u32) -> Self {
        Self {
            pages,
            chunk_calls: Mutex::new(HashMap::new()),
            book_calls: AtomicU32::new(0),
        }
    }

    fn calls_for(&self, index: u32) -> u32 {
        self.chunk_calls
            .lock()
            .unwrap()
            .get(&index)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ContentSource for Library {
    async fn fetch_chunk(&self, key: &ChunkKey) -> Result<Chunk, ContentError> {
        *self
            .chunk_calls
            .lock()
            .unwrap()
            .entry(key.index())
            .or_default() += 1;
        if key.content_id() != "moby" || key.index() >= self.pages {
            return Err(ContentError::chunk_not_found(key));
        }
        Ok(Chunk::new(
            key.clone(),
            format!("Call me Ishmael, page {}", key.index()),
        ))
    }

    async fn fetch_book(&self, id: &str) -> Result<Book, ContentError> {
        self.book_calls.fetch_add(1, Ordering::SeqCst);
        if id != "moby" {
            return Err(ContentError::book_not_found(id));
        }
        Ok(Book {
            id: id.to_string(),
            title: "Moby Dick".into(),
            author: "Herman Melville".into(),
            description: String::new(),
            cover_url: None,
            pages: self.pages,
        })
    }
}

#[derive(Default)]
struct ManualEngine {
    requests: Mutex<Vec<SpeechRequest>>,
    senders: Mutex<Vec<mpsc::UnboundedSender<EngineEvent>>>,
    resumes: AtomicU32,
}

impl ManualEngine {
    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn end_current(&self) {
        let senders = self.senders.lock().unwrap();
        senders.last().unwrap().send(EngineEvent::End).unwrap();
    }
}

#[async_trait]
impl SpeechEngine for ManualEngine {
    async fn speak(
        &self,
        request: SpeechRequest,
    ) -> Result<mpsc::UnboundedReceiver<EngineEvent>, EngineError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.requests.lock().unwrap().push(request);
        self.senders.lock().unwrap().push(tx);
        Ok(rx)
    }

    fn cancel(&self) {}

    fn pause(&self) {}

    fn resume(&self) {
        self.resumes.fetch_add(1, Ordering::SeqCst);
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        vec![
            VoiceInfo::new("Robot", "xx-XX", false),
            VoiceInfo::new("Karen", "en-AU", false),
            VoiceInfo::new("Ava Premium", "en-US", true),
        ]
    }

    fn has_native_timing(&self) -> bool {
        true
    }
}

struct Harness {
    service: Arc<ReaderService>,
    library: Arc<Library>,
    engine: Arc<ManualEngine>,
    preferences: Arc<InMemoryPreferences>,
    _events: mpsc::UnboundedReceiver<PlaybackEvent>,
}

fn harness(pages: u32) -> Harness {
    let library = Arc::new(Library::new(pages));
    let engine = Arc::new(ManualEngine::default());
    let preferences = Arc::new(InMemoryPreferences::new());
    let deps = ReaderDeps {
        content: Arc::clone(&library) as Arc<dyn ContentSource>,
        engine: Arc::clone(&engine) as Arc<dyn SpeechEngine>,
        preferences: Arc::clone(&preferences) as Arc<dyn PreferenceStore>,
        diagnostics: Arc::new(NoopDiagnostics),
    };
    let (service, events) = ReaderService::new(deps, Settings::default()).unwrap();
    Harness {
        service: Arc::new(service),
        library,
        engine,
        preferences,
        _events: events,
    }
}

async fn settle(mut done: impl FnMut() -> bool) {
    for _ in 0..100 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}

fn spawn_speaking(
    service: &Arc<ReaderService>,
    text: &'static str,
) -> tokio::task::JoinHandle<Result<SessionOutcome, ReaderError>> {
    let service = Arc::clone(service);
    tokio::spawn(async move { service.start_speaking(text).await })
}

// ── Pages ──────────────────────────────────────────────────────────

#[tokio::test]
async fn change_page_loads_page_and_warms_next() {
    let h = harness(10);

    let page = h.service.change_page("moby", 2).await.unwrap();

    assert_eq!(page.chunk.text, "Call me Ishmael, page 2");
    assert_eq!(page.book.title, "Moby Dick");
    // 5 words at 200 wpm
    assert_eq!(page.reading_seconds, 2);

    let chunks = h.service.chunks();
    settle(|| (3..=5).all(|i| chunks.is_cached(&ChunkKey::new("moby", i)))).await;
    assert!(!chunks.is_cached(&ChunkKey::new("moby", 6)));
    assert_eq!(h.library.calls_for(3), 1);
}

#[tokio::test]
async fn read_ahead_stops_at_last_page() {
    let h = harness(3);

    h.service.change_page("moby", 1).await.unwrap();

    let chunks = h.service.chunks();
    settle(|| chunks.is_cached(&ChunkKey::new("moby", 2)) && chunks.in_flight_count() == 0).await;
    assert_eq!(h.library.calls_for(3), 0);
}

#[tokio::test]
async fn change_page_past_end_is_rejected() {
    let h = harness(3);

    let err = h.service.change_page("moby", 3).await.unwrap_err();

    assert!(matches!(
        err,
        ReaderError::PageOutOfRange {
            index: 3,
            pages: 3,
            ..
        }
    ));
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let h = harness(3);
    let err = h.service.change_page("nope", 0).await.unwrap_err();
    assert!(matches!(err, ReaderError::Content(ContentError::NotFound(_))));
}

#[tokio::test]
async fn clear_cache_drops_chunks_and_books() {
    let h = harness(3);

    h.service.get_book("moby").await.unwrap();
    h.service.get_chunk("moby", 0).await.unwrap();
    h.service.clear_cache();
    h.service.get_book("moby").await.unwrap();
    h.service.get_chunk("moby", 0).await.unwrap();

    assert_eq!(h.library.book_calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.library.calls_for(0), 2);
}

#[tokio::test]
async fn explicit_prefetch_waits_for_fetches() {
    let h = harness(10);

    let summary = h.service.prefetch("moby", 0, 3).await;

    assert_eq!(summary.dispatched, 3);
    assert!(h.service.chunks().is_cached(&ChunkKey::new("moby", 3)));
}

// ── Speech ─────────────────────────────────────────────────────────

#[tokio::test]
async fn change_page_stops_speaking() {
    let h = harness(10);

    let speaking = spawn_speaking(&h.service, "Call me Ishmael");
    let engine = Arc::clone(&h.engine);
    settle(|| engine.request_count() == 1).await;

    h.service.change_page("moby", 1).await.unwrap();

    assert_eq!(speaking.await.unwrap().unwrap(), SessionOutcome::Cancelled);
}

#[tokio::test]
async fn play_resumes_a_paused_session() {
    let h = harness(10);

    let speaking = spawn_speaking(&h.service, "Call me Ishmael");
    let engine = Arc::clone(&h.engine);
    settle(|| engine.request_count() == 1).await;

    assert!(h.service.pause_speaking());
    assert_eq!(
        h.service.play("ignored").await.unwrap(),
        PlayOutcome::Resumed
    );
    assert_eq!(h.engine.resumes.load(Ordering::SeqCst), 1);
    assert_eq!(h.engine.request_count(), 1);

    h.engine.end_current();
    assert_eq!(speaking.await.unwrap().unwrap(), SessionOutcome::Ended);
}

#[tokio::test]
async fn play_starts_when_nothing_is_paused() {
    let h = harness(10);

    let service = Arc::clone(&h.service);
    let playing = tokio::spawn(async move { service.play("Call me Ishmael").await });
    let engine = Arc::clone(&h.engine);
    settle(|| engine.request_count() == 1).await;
    h.engine.end_current();

    assert_eq!(
        playing.await.unwrap().unwrap(),
        PlayOutcome::Finished(SessionOutcome::Ended)
    );
}

#[tokio::test]
async fn stop_speaking_is_idempotent() {
    let h = harness(10);
    h.service.stop_speaking();
    h.service.stop_speaking();
    assert!(!h.service.resume_speaking());
}

#[tokio::test]
async fn stored_audio_settings_shape_the_request() {
    let h = harness(10);
    h.service
        .update_audio_settings(&VoiceParams {
            voice: Some("Karen".into()),
            rate: 1.5,
            pitch: 1.0,
            volume: 0.5,
        })
        .await
        .unwrap();

    let speaking = spawn_speaking(&h.service, "Call me Ishmael");
    let engine = Arc::clone(&h.engine);
    settle(|| engine.request_count() == 1).await;

    let request = h.engine.requests.lock().unwrap()[0].clone();
    assert_eq!(request.params.voice.as_deref(), Some("Karen"));
    assert!((request.params.rate - 1.5).abs() < 1e-6);
    assert!((request.params.volume - 0.5).abs() < 1e-6);

    h.engine.end_current();
    speaking.await.unwrap().unwrap();
}

#[tokio::test]
async fn unavailable_voice_falls_back_to_engine_default() {
    let h = harness(10);
    h.service
        .update_audio_settings(&VoiceParams::default().with_voice("Gone"))
        .await
        .unwrap();

    let speaking = spawn_speaking(&h.service, "Call me Ishmael");
    let engine = Arc::clone(&h.engine);
    settle(|| engine.request_count() == 1).await;

    assert_eq!(h.engine.requests.lock().unwrap()[0].params.voice, None);
    h.engine.end_current();
    speaking.await.unwrap().unwrap();
}

// ── Voices and settings ────────────────────────────────────────────

#[tokio::test]
async fn voices_are_ranked_and_filtered() {
    let h = harness(1);
    let names: Vec<String> = h.service.voices().into_iter().map(|v| v.name).collect();
    assert_eq!(names, ["Ava Premium", "Karen"]);
}

#[tokio::test]
async fn audio_settings_default_then_persist() {
    let h = harness(1);
    assert_eq!(h.service.audio_settings().await.unwrap(), VoiceParams::default());

    let params = VoiceParams {
        voice: Some("Ava Premium".into()),
        rate: 0.8,
        pitch: 1.2,
        volume: 1.0,
    };
    h.service.update_audio_settings(&params).await.unwrap();

    assert_eq!(h.service.audio_settings().await.unwrap(), params);
    assert!(h.preferences.get(AUDIO_SETTINGS_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn invalid_audio_settings_are_not_stored() {
    let h = harness(1);
    let err = h
        .service
        .update_audio_settings(&VoiceParams {
            volume: 3.0,
            ..VoiceParams::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ReaderError::InvalidAudioSettings(_)));
    assert!(h.preferences.get(AUDIO_SETTINGS_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn corrupt_audio_settings_surface_an_error() {
    let h = harness(1);
    h.preferences
        .set(AUDIO_SETTINGS_KEY, "{not json".into())
        .await
        .unwrap();

    assert!(matches!(
        h.service.audio_settings().await,
        Err(ReaderError::Preferences(_))
    ));
}

#[test]
fn invalid_settings_rejected_at_construction() {
    let deps = ReaderDeps {
        content: Arc::new(Library::new(1)),
        engine: Arc::new(ManualEngine::default()),
        preferences: Arc::new(InMemoryPreferences::new()),
        diagnostics: Arc::new(NoopDiagnostics),
    };
    let settings = Settings {
        book_cache_capacity: 0,
        ..Settings::default()
    };
    assert!(matches!(
        ReaderService::new(deps, settings),
        Err(ReaderError::Settings(_))
    ));
}
