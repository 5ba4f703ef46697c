// src/checker.rs
// Check orchestrator: resolve → fingerprint → extract → match, per entry.
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use metrics::counter;
use tokio::sync::Mutex;

use crate::extract::TextExtractor;
use crate::fingerprint::{fingerprint, has_changed};
use crate::matcher::match_keywords;
use crate::monitoring::{CheckResult, MonitoringEntry};
use crate::notify::{NotificationEvent, Notifier};
use crate::resolver::DocumentSource;
use crate::store::MonitoringStore;

pub struct Checker {
    source: Arc<dyn DocumentSource>,
    extractor: Arc<dyn TextExtractor>,
    store: Arc<dyn MonitoringStore>,
    notifier: Arc<dyn Notifier>,
    // One guard per entry id: an ad hoc "check now" can never interleave
    // with the scheduled check for the same entry.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Checker {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        extractor: Arc<dyn TextExtractor>,
        store: Arc<dyn MonitoringStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            extractor,
            store,
            notifier,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn entry_lock(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run one check for `entry_id`, loading fresh state from the store.
    ///
    /// State writes, in order of occurrence:
    /// 1. unresolvable source → `last_checked_at` only (the attempt is
    ///    recorded either way);
    /// 2. unchanged content → `last_checked_at` only, and extraction is
    ///    skipped entirely;
    /// 3. changed content → fingerprint + `last_checked_at` persisted
    ///    *before* extraction, so a crash mid-match cannot replay the same
    ///    change as "new" next round;
    /// 4. keyword occurrence → `occurrences` incremented (by at most 1) and
    ///    the notification collaborator signaled, best-effort.
    pub async fn run_check(&self, entry_id: &str) -> Result<CheckResult> {
        let lock = self.entry_lock(entry_id).await;
        let _guard = lock.lock().await;

        let mut entry = self
            .store
            .get(entry_id)
            .await?
            .with_context(|| format!("unknown monitoring entry: {entry_id}"))?;

        let doc = match self.source.resolve(&entry.source_url).await {
            Ok(doc) => doc,
            Err(e) => {
                counter!("watch_checks_unresolved_total").increment(1);
                tracing::warn!(entry = %entry.id, error = %e, "check could not resolve content");
                entry.last_checked_at = Utc::now();
                self.store
                    .update(&entry)
                    .await
                    .context("persist check attempt")?;
                return Ok(CheckResult::default());
            }
        };

        let current = fingerprint(&doc.bytes);
        if !has_changed(entry.last_fingerprint.as_deref(), &current) {
            tracing::debug!(entry = %entry.id, "content unchanged, skipping extraction");
            entry.last_checked_at = Utc::now();
            self.store
                .update(&entry)
                .await
                .context("persist unchanged check")?;
            return Ok(CheckResult::default());
        }

        entry.last_fingerprint = Some(current);
        entry.last_checked_at = Utc::now();
        self.store
            .update(&entry)
            .await
            .context("persist new fingerprint")?;

        let text = self.extractor.extract_text(&doc.bytes);
        let matched = match_keywords(&text, &doc.filename, &entry.keywords());

        if matched.is_empty() {
            tracing::info!(entry = %entry.id, "content changed, no keyword occurrence");
            return Ok(CheckResult::changed(vec![]));
        }

        entry.occurrences += 1;
        self.store
            .update(&entry)
            .await
            .context("persist occurrence")?;
        counter!("watch_occurrences_total").increment(1);
        tracing::info!(entry = %entry.id, keywords = ?matched, "keyword occurrence found");

        let ev = NotificationEvent::occurrence(&entry, matched.clone());
        if let Err(e) = self.notifier.send(&ev).await {
            // Delivery is best-effort; check state above is already committed.
            tracing::warn!(entry = %entry.id, error = ?e, "occurrence notification failed");
        }

        Ok(CheckResult::changed(matched))
    }

    /// One-time signal when an entry first turns active. Best-effort, like
    /// every other outbound notification.
    pub async fn announce_activation(&self, entry: &MonitoringEntry) {
        let ev = NotificationEvent::activated(entry);
        if let Err(e) = self.notifier.send(&ev).await {
            tracing::warn!(entry = %entry.id, error = ?e, "activation notification failed");
        }
    }
}
