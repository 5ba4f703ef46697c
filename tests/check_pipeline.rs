// tests/check_pipeline.rs
// State-machine properties of a single monitoring check.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use edital_watch::checker::Checker;
use edital_watch::extract::TextExtractor;
use edital_watch::monitoring::{MonitoringEntry, MonitoringStatus};
use edital_watch::notify::{NotificationEvent, Notifier};
use edital_watch::resolver::{DocumentSource, ResolveError, ResolvedDocument};
use edital_watch::store::{MemoryStore, MonitoringStore};

/// Serves a swappable canned document, or `Unreachable` when unset.
struct StubSource {
    doc: Mutex<Option<ResolvedDocument>>,
}

impl StubSource {
    fn serving(bytes: &[u8], filename: &str) -> Self {
        Self {
            doc: Mutex::new(Some(ResolvedDocument {
                bytes: bytes.to_vec(),
                filename: filename.to_string(),
            })),
        }
    }

    fn unreachable() -> Self {
        Self {
            doc: Mutex::new(None),
        }
    }

    fn set(&self, bytes: &[u8], filename: &str) {
        *self.doc.lock().unwrap() = Some(ResolvedDocument {
            bytes: bytes.to_vec(),
            filename: filename.to_string(),
        });
    }
}

#[async_trait]
impl DocumentSource for StubSource {
    async fn resolve(&self, _url: &str) -> Result<ResolvedDocument, ResolveError> {
        self.doc
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ResolveError::Unreachable("connection timed out".into()))
    }
}

/// Counts extraction calls and returns a fixed text.
struct SpyExtractor {
    calls: AtomicUsize,
    text: String,
}

impl SpyExtractor {
    fn returning(text: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            text: text.to_string(),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextExtractor for SpyExtractor {
    fn extract_text(&self, _bytes: &[u8]) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text.clone()
    }
}

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingNotifier {
    fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, ev: &NotificationEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(ev.clone());
        Ok(())
    }
}

fn wire(
    source: Arc<StubSource>,
    extractor: Arc<SpyExtractor>,
) -> (Arc<MemoryStore>, Arc<RecordingNotifier>, Checker) {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let checker = Checker::new(source, extractor, store.clone(), notifier.clone());
    (store, notifier, checker)
}

#[tokio::test]
async fn unchanged_content_short_circuits_extraction_and_notification() {
    let source = Arc::new(StubSource::serving(b"%PDF-fake v1", "diario.pdf"));
    let extractor = Arc::new(SpyExtractor::returning("resultado do Edital 10/2025"));
    let (store, notifier, checker) = wire(source, extractor.clone());

    store
        .insert(MonitoringEntry::radar(
            "m1",
            "https://g.example/d",
            "Edital 10/2025",
            "a@b.c",
        ))
        .await;

    let first = checker.run_check("m1").await.unwrap();
    assert!(first.content_changed);
    assert!(first.matched);
    assert_eq!(extractor.calls(), 1);
    assert_eq!(notifier.count(), 1);

    let second = checker.run_check("m1").await.unwrap();
    assert!(!second.content_changed);
    assert!(!second.matched);
    // No re-extraction, no second occurrence, no second mail.
    assert_eq!(extractor.calls(), 1);
    assert_eq!(notifier.count(), 1);

    let entry = store.get("m1").await.unwrap().unwrap();
    assert_eq!(entry.occurrences, 1);
}

#[tokio::test]
async fn byte_difference_is_a_change() {
    let source = Arc::new(StubSource::serving(b"%PDF-fake v1", "diario.pdf"));
    let extractor = Arc::new(SpyExtractor::returning("nothing relevant here"));
    let (store, _notifier, checker) = wire(source.clone(), extractor.clone());

    store
        .insert(MonitoringEntry::radar(
            "m1",
            "https://g.example/d",
            "Edital 10/2025",
            "a@b.c",
        ))
        .await;

    let first = checker.run_check("m1").await.unwrap();
    assert!(first.content_changed);
    let fp1 = store.get("m1").await.unwrap().unwrap().last_fingerprint;

    source.set(b"%PDF-fake v2", "diario.pdf");
    let second = checker.run_check("m1").await.unwrap();
    assert!(second.content_changed);
    assert!(!second.matched);

    let entry = store.get("m1").await.unwrap().unwrap();
    assert_ne!(entry.last_fingerprint, fp1);
    assert_eq!(extractor.calls(), 2);
    // Content changed twice, but nothing ever matched.
    assert_eq!(entry.occurrences, 0);
}

#[tokio::test]
async fn unreachable_source_bumps_only_last_checked_at() {
    let source = Arc::new(StubSource::unreachable());
    let extractor = Arc::new(SpyExtractor::returning("irrelevant"));
    let (store, notifier, checker) = wire(source, extractor.clone());

    let mut entry = MonitoringEntry::radar("m1", "https://g.example/d", "Edital 1/2025", "a@b.c");
    entry.last_fingerprint = Some("deadbeef".into());
    entry.occurrences = 3;
    entry.last_checked_at = chrono::Utc::now() - chrono::Duration::hours(1);
    let before = entry.last_checked_at;
    store.insert(entry).await;

    let result = checker.run_check("m1").await.unwrap();
    assert!(!result.content_changed);
    assert!(!result.matched);

    let after = store.get("m1").await.unwrap().unwrap();
    assert_eq!(after.last_fingerprint.as_deref(), Some("deadbeef"));
    assert_eq!(after.occurrences, 3);
    // Pinned policy: the failed attempt is still recorded.
    assert!(after.last_checked_at > before);
    assert_eq!(extractor.calls(), 0);
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn personal_matches_candidate_name_radar_does_not() {
    let source = Arc::new(StubSource::serving(b"%PDF-fake v1", "diario.pdf"));
    let extractor = Arc::new(SpyExtractor::returning("convocação de MARIA SOUZA"));
    let (store, _notifier, checker) = wire(source, extractor);

    store
        .insert(MonitoringEntry::personal(
            "personal",
            "https://g.example/d",
            "Edital 1/2025",
            "Maria Souza",
            "a@b.c",
        ))
        .await;
    let mut radar = MonitoringEntry::radar("radar", "https://g.example/d", "Edital 1/2025", "a@b.c");
    // A stray candidate name on a radar entry must never be searched.
    radar.candidate_name = Some("Maria Souza".into());
    store.insert(radar).await;

    let personal = checker.run_check("personal").await.unwrap();
    assert_eq!(personal.matched_keywords, vec!["Maria Souza".to_string()]);

    let radar = checker.run_check("radar").await.unwrap();
    assert!(radar.content_changed);
    assert!(!radar.matched);
}

#[tokio::test]
async fn resolved_filename_alone_can_match() {
    let source = Arc::new(StubSource::serving(b"%PDF-fake v1", "edital-55-2025-gabarito.pdf"));
    let extractor = Arc::new(SpyExtractor::returning(""));
    let (store, notifier, checker) = wire(source, extractor);

    store
        .insert(MonitoringEntry::radar(
            "m1",
            "https://g.example/d",
            "Edital-55-2025",
            "a@b.c",
        ))
        .await;

    let result = checker.run_check("m1").await.unwrap();
    assert!(result.matched);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn activation_is_announced_once() {
    let source = Arc::new(StubSource::unreachable());
    let extractor = Arc::new(SpyExtractor::returning(""));
    let (store, notifier, checker) = wire(source, extractor);

    let mut entry = MonitoringEntry::radar("m1", "https://g.example/d", "Edital 1/2025", "a@b.c");
    entry.status = MonitoringStatus::Inactive;
    store.insert(entry).await;

    if let Some(activated) = store.activate("m1").await {
        checker.announce_activation(&activated).await;
    }
    // Second activation is a no-op transition: no signal.
    if let Some(activated) = store.activate("m1").await {
        checker.announce_activation(&activated).await;
    }

    assert_eq!(notifier.count(), 1);
    let events = notifier.events.lock().unwrap();
    assert!(matches!(
        &events[0],
        NotificationEvent::MonitoringActivated { entry_id, .. } if entry_id == "m1"
    ));
}
