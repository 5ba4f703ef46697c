// src/notify/mod.rs
pub mod email;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::monitoring::MonitoringEntry;

/// Outbound signal for the notification collaborator. Emitted by the check
/// pipeline; delivery failure never rolls back check state.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// One-time signal when an entry first turns active.
    MonitoringActivated {
        entry_id: String,
        to_email: String,
        edital_identifier: String,
        source_url: String,
        keywords: Vec<String>,
    },
    /// Newly changed content matched at least one keyword.
    OccurrenceFound {
        entry_id: String,
        to_email: String,
        edital_identifier: String,
        source_url: String,
        matched_keywords: Vec<String>,
        ts: DateTime<Utc>,
    },
}

impl NotificationEvent {
    pub fn activated(entry: &MonitoringEntry) -> Self {
        Self::MonitoringActivated {
            entry_id: entry.id.clone(),
            to_email: entry.owner_email.clone(),
            edital_identifier: entry.edital_identifier.clone(),
            source_url: entry.source_url.clone(),
            keywords: entry.keywords(),
        }
    }

    pub fn occurrence(entry: &MonitoringEntry, matched_keywords: Vec<String>) -> Self {
        Self::OccurrenceFound {
            entry_id: entry.id.clone(),
            to_email: entry.owner_email.clone(),
            edital_identifier: entry.edital_identifier.clone(),
            source_url: entry.source_url.clone(),
            matched_keywords,
            ts: Utc::now(),
        }
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, ev: &NotificationEvent) -> Result<()>;
}

/// Fan-out to the configured channels. Channels disable themselves when
/// their env is missing; with none configured, events are only logged.
pub struct NotifierMux {
    email: Option<email::EmailNotifier>,
}

impl NotifierMux {
    pub fn from_env() -> Self {
        let email = email::EmailNotifier::from_env();
        if email.is_none() {
            tracing::info!("email channel disabled (SMTP env not set); notifications will be logged only");
        }
        Self { email }
    }

    pub async fn notify(&self, ev: &NotificationEvent) {
        match &self.email {
            Some(email) => {
                if let Err(e) = email.send(ev).await {
                    tracing::warn!(error = ?e, "email notification failed");
                }
            }
            None => tracing::info!(event = ?ev, "notification"),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for NotifierMux {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        self.notify(ev).await;
        Ok(())
    }
}
