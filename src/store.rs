// src/store.rs
use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::monitoring::{MonitoringEntry, MonitoringStatus};

/// Persistence seam for monitoring entries. The check pipeline never assumes
/// an in-process map behind this; a database-backed implementation only has
/// to honor these three calls.
#[async_trait]
pub trait MonitoringStore: Send + Sync {
    /// Entries the scheduler should poll this round.
    async fn list_active(&self) -> Result<Vec<MonitoringEntry>>;

    async fn get(&self, id: &str) -> Result<Option<MonitoringEntry>>;

    /// Persist the entry's check state (fingerprint, timestamp, occurrences).
    async fn update(&self, entry: &MonitoringEntry) -> Result<()>;
}

/// In-memory store, keyed by entry id. Writes are last-writer-wins, which is
/// safe here because the checker serializes writers per entry.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MonitoringEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, entry: MonitoringEntry) {
        self.entries.write().await.insert(entry.id.clone(), entry);
    }

    /// Flip an entry to active. Returns the updated entry when this call was
    /// the transition (so the caller can emit the one-time activation
    /// signal); `None` when the entry was already active or unknown.
    pub async fn activate(&self, id: &str) -> Option<MonitoringEntry> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(id)?;
        if entry.status == MonitoringStatus::Active {
            return None;
        }
        entry.status = MonitoringStatus::Active;
        Some(entry.clone())
    }

    pub async fn deactivate(&self, id: &str) {
        if let Some(entry) = self.entries.write().await.get_mut(id) {
            entry.status = MonitoringStatus::Inactive;
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl MonitoringStore for MemoryStore {
    async fn list_active(&self) -> Result<Vec<MonitoringEntry>> {
        let entries = self.entries.read().await;
        let mut active: Vec<MonitoringEntry> =
            entries.values().filter(|e| e.is_active()).cloned().collect();
        // Stable round order regardless of map iteration.
        active.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(active)
    }

    async fn get(&self, id: &str) -> Result<Option<MonitoringEntry>> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    async fn update(&self, entry: &MonitoringEntry) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(entry.id.clone(), entry.clone());
        Ok(())
    }
}
