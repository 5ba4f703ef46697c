// src/monitoring.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which keyword set a monitoring builds.
/// `Personal` watches for a candidate by name; `Radar` only tracks the edital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitoringKind {
    Personal,
    Radar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitoringStatus {
    Active,
    #[default]
    Inactive,
}

/// A user's standing request to watch one gazette URL.
///
/// The check pipeline is the only writer of the mutable fields
/// (`last_fingerprint`, `last_checked_at`, `occurrences`); everything else is
/// set at creation time by whoever feeds the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringEntry {
    pub id: String,
    pub kind: MonitoringKind,
    pub source_url: String,
    pub edital_identifier: String,
    #[serde(default)]
    pub candidate_name: Option<String>,
    /// SHA-256 of the last resolved document; `None` until the first
    /// successful fetch.
    #[serde(default)]
    pub last_fingerprint: Option<String>,
    #[serde(default = "Utc::now")]
    pub last_checked_at: DateTime<Utc>,
    #[serde(default)]
    pub occurrences: u32,
    #[serde(default)]
    pub status: MonitoringStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Recipient for the notification collaborator.
    pub owner_email: String,
}

impl MonitoringEntry {
    pub fn personal(
        id: &str,
        source_url: &str,
        edital_identifier: &str,
        candidate_name: &str,
        owner_email: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            kind: MonitoringKind::Personal,
            source_url: source_url.to_string(),
            edital_identifier: edital_identifier.to_string(),
            candidate_name: Some(candidate_name.to_string()),
            last_fingerprint: None,
            last_checked_at: Utc::now(),
            occurrences: 0,
            status: MonitoringStatus::Active,
            created_at: Utc::now(),
            owner_email: owner_email.to_string(),
        }
    }

    pub fn radar(id: &str, source_url: &str, edital_identifier: &str, owner_email: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: MonitoringKind::Radar,
            source_url: source_url.to_string(),
            edital_identifier: edital_identifier.to_string(),
            candidate_name: None,
            last_fingerprint: None,
            last_checked_at: Utc::now(),
            occurrences: 0,
            status: MonitoringStatus::Active,
            created_at: Utc::now(),
            owner_email: owner_email.to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MonitoringStatus::Active
    }

    /// Keyword set for the matcher: the edital identifier always, plus the
    /// candidate name for `Personal` entries. `Radar` ignores a candidate
    /// name even when one is present.
    pub fn keywords(&self) -> Vec<String> {
        let mut kws = vec![self.edital_identifier.clone()];
        if self.kind == MonitoringKind::Personal {
            if let Some(name) = &self.candidate_name {
                if !name.trim().is_empty() {
                    kws.push(name.clone());
                }
            }
        }
        kws
    }
}

/// Outcome of one check, handed to the caller (and, when `matched`, to the
/// notification collaborator).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub matched: bool,
    pub matched_keywords: Vec<String>,
    pub content_changed: bool,
}

impl CheckResult {
    pub fn changed(matched_keywords: Vec<String>) -> Self {
        Self {
            matched: !matched_keywords.is_empty(),
            matched_keywords,
            content_changed: true,
        }
    }
}
