//! Content fingerprints for target sources

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 fingerprint of a target source (uploaded image bytes, wish text).
///
/// Target caches key generated fields by this value so a field is only
/// rebuilt when its source actually changes, and so results of a superseded
/// background job can be recognised and dropped.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Fingerprint raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Fingerprint a text source
    pub fn of_text(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// Fingerprint a text source together with a particle count, so the same
    /// string sampled for a different field size gets its own cache entry.
    pub fn of_source(kind: &str, data: &[u8], count: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(kind.as_bytes());
        hasher.update((count as u64).to_le_bytes());
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}
