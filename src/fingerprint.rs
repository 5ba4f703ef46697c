// src/fingerprint.rs
use sha2::{Digest, Sha256};

/// Opaque content fingerprint: hex-encoded SHA-256 of the raw document
/// bytes. Stable across restarts, so equal documents always compare equal.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// True iff there is no previous fingerprint (first-ever fetch) or the
/// content differs.
pub fn has_changed(previous: Option<&str>, current: &str) -> bool {
    match previous {
        None => true,
        Some(prev) => prev != current,
    }
}
