//! Snapshot id generation
//!
//! Ids come from an explicit [`IdSource`] handed to the lifecycle rather
//! than from ambient clock reads inside the engine. The wall-clock source
//! reproduces the legacy nanosecond-timestamp ids; the counter source is
//! deterministic for tests and reproducible runs; [`content_digest`] covers
//! the hash-of-manifest alternative for callers that want ids to follow
//! content.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use sha2::{Digest, Sha256};

/// Where snapshot ids come from
#[derive(Debug)]
pub enum IdSource {
    /// Current wall-clock time in nanoseconds. Strictly increasing under
    /// normal clock behavior; not guaranteed under clock adjustments.
    Clock,
    /// An explicit monotonic counter
    Counter(AtomicI64),
}

impl IdSource {
    pub fn clock() -> Self {
        Self::Clock
    }

    pub fn counter() -> Self {
        Self::counter_from(0)
    }

    /// A counter whose first id is `start + 1`
    pub fn counter_from(start: i64) -> Self {
        Self::Counter(AtomicI64::new(start))
    }

    /// Produce the next id
    pub fn next(&self) -> i64 {
        match self {
            Self::Clock => {
                let now = Utc::now();
                // Nanosecond timestamps overflow i64 in 2262; fall back to
                // microsecond precision rather than failing.
                now.timestamp_nanos_opt()
                    .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000))
            }
            Self::Counter(counter) => counter.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }
}

impl Default for IdSource {
    fn default() -> Self {
        Self::clock()
    }
}

/// SHA256 digest of a serialized manifest, hex-encoded
pub fn content_digest(yaml: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(yaml.as_bytes());
    hex::encode(hasher.finalize())
}

// We need hex encoding - add it inline to avoid another dependency
mod hex {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode<T: AsRef<[u8]>>(data: T) -> String {
        let bytes = data.as_ref();
        let mut hex = String::with_capacity(bytes.len() * 2);
        for &byte in bytes {
            hex.push(HEX_CHARS[(byte >> 4) as usize] as char);
            hex.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
        }
        hex
    }
}
