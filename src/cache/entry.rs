use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Cached value plus the metadata needed to judge its liveness.
///
/// The same envelope is written to the durable tier, so expiry is self-contained in each file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Stored payload.
    pub data: T,
    /// Insertion time, Unix milliseconds.
    pub stored_at_ms: u64,
    /// Time to live in milliseconds.
    pub ttl_ms: u64,
    /// Approximate serialized size, computed at insert.
    #[serde(default)]
    pub size_bytes: Option<u64>,
    /// Successful reads served from this entry.
    #[serde(default)]
    pub hit_count: u64,
}

impl<T> CacheEntry<T> {
    pub(crate) fn new(data: T, stored_at_ms: u64, ttl: Duration, size_bytes: Option<u64>) -> Self {
        Self {
            data,
            stored_at_ms,
            ttl_ms: duration_ms(ttl),
            size_bytes,
            hit_count: 0,
        }
    }

    /// `true` iff `now - stored_at <= ttl`.
    pub fn is_live_at(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.stored_at_ms) <= self.ttl_ms
    }
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_ms)
        .unwrap_or(0)
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
