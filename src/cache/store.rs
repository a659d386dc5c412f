use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cache::entry::{CacheEntry, now_ms};
use crate::cache::file_tier::FileTier;
use crate::cache::key::CacheKey;
use crate::cache::stats::CacheStats;
use crate::foundation::error::{AdcraftError, AdcraftResult};

/// Limits and storage location for a [`RenderCache`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOpts {
    /// Durable tier directory. `None` keeps the cache in memory only.
    pub dir: Option<PathBuf>,
    /// Maximum entries held by the in-process tier.
    pub max_entries: usize,
    /// Maximum tracked bytes held by the in-process tier.
    pub max_size_bytes: u64,
    /// TTL applied when `set` is called without one.
    pub default_ttl_secs: u64,
    /// Run eviction after every insert.
    pub auto_evict: bool,
}

impl Default for CacheOpts {
    fn default() -> Self {
        Self {
            dir: None,
            max_entries: 1000,
            max_size_bytes: 100 * 1024 * 1024,
            default_ttl_secs: 3600,
            auto_evict: true,
        }
    }
}

impl CacheOpts {
    /// Reject limits that would make the cache unusable.
    pub fn validate(&self) -> AdcraftResult<()> {
        if self.max_entries == 0 {
            return Err(AdcraftError::validation("cache max_entries must be > 0"));
        }
        if self.max_size_bytes == 0 {
            return Err(AdcraftError::validation("cache max_size_bytes must be > 0"));
        }
        if self.default_ttl_secs == 0 {
            return Err(AdcraftError::validation("cache default_ttl_secs must be > 0"));
        }
        Ok(())
    }

    /// Default TTL as a [`Duration`].
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

struct Slot {
    entry: CacheEntry<serde_json::Value>,
    // Breaks `stored_at_ms` ties so eviction order is exactly insertion order.
    seq: u64,
}

#[derive(Default)]
struct MemoryTier {
    slots: HashMap<String, Slot>,
    total_bytes: u64,
    next_seq: u64,
    hits: u64,
    misses: u64,
}

impl MemoryTier {
    fn insert(&mut self, key: &str, entry: CacheEntry<serde_json::Value>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.total_bytes += entry.size_bytes.unwrap_or(0);
        if let Some(old) = self.slots.insert(key.to_owned(), Slot { entry, seq }) {
            self.total_bytes = self
                .total_bytes
                .saturating_sub(old.entry.size_bytes.unwrap_or(0));
        }
    }

    fn remove(&mut self, key: &str) -> Option<Slot> {
        let slot = self.slots.remove(key)?;
        self.total_bytes = self
            .total_bytes
            .saturating_sub(slot.entry.size_bytes.unwrap_or(0));
        Some(slot)
    }

    fn oldest_key(&self) -> Option<String> {
        self.slots
            .iter()
            .min_by_key(|(_, s)| (s.entry.stored_at_ms, s.seq))
            .map(|(k, _)| k.clone())
    }

    /// Count limit first (one entry), then the size limit (oldest first until under budget).
    fn evict(&mut self, max_entries: usize, max_bytes: u64) -> usize {
        let mut evicted = 0;

        if self.slots.len() > max_entries
            && let Some(k) = self.oldest_key()
        {
            self.remove(&k);
            tracing::debug!(key = %k, reason = "count", "cache eviction");
            evicted += 1;
        }

        let mut budget = self.slots.len();
        while self.total_bytes > max_bytes && budget > 0 {
            let Some(k) = self.oldest_key() else {
                break;
            };
            self.remove(&k);
            tracing::debug!(key = %k, reason = "size", "cache eviction");
            evicted += 1;
            budget -= 1;
        }

        evicted
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entry_count: self.slots.len(),
            total_memory_bytes: self.total_bytes,
        }
    }
}

/// Two-tier TTL cache for render-pipeline payloads.
///
/// The in-process tier is a bounded map; the optional durable tier keeps one JSON envelope per
/// key on disk and survives restarts. Values are stored as JSON, so callers always receive an
/// owned copy and never alias cache internals.
///
/// No operation returns an error once the cache is constructed: storage problems degrade to a
/// miss or to memory-only operation.
pub struct RenderCache {
    opts: CacheOpts,
    memory: Mutex<MemoryTier>,
    durable: Option<FileTier>,
}

impl std::fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCache")
            .field("opts", &self.opts)
            .field("stats", &self.stats())
            .finish()
    }
}

impl RenderCache {
    /// Validate `opts` and open the durable tier (creating its directory) when configured.
    pub fn new(opts: CacheOpts) -> AdcraftResult<Self> {
        opts.validate()?;
        let durable = match &opts.dir {
            Some(dir) => Some(FileTier::open(dir)?),
            None => None,
        };
        Ok(Self {
            opts,
            memory: Mutex::new(MemoryTier::default()),
            durable,
        })
    }

    /// Options this cache was built with.
    pub fn opts(&self) -> &CacheOpts {
        &self.opts
    }

    /// Look up `key`, first in memory, then in the durable tier (promoting a live hit).
    ///
    /// Expired entries found on the way are deleted. Every call counts as a hit or a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let now = now_ms();
        {
            let mut guard = self.memory.lock();
            let mem = &mut *guard;
            let mut expired = false;
            if let Some(slot) = mem.slots.get_mut(key.as_str()) {
                if slot.entry.is_live_at(now) {
                    match serde_json::from_value::<T>(slot.entry.data.clone()) {
                        Ok(v) => {
                            slot.entry.hit_count += 1;
                            mem.hits += 1;
                            tracing::debug!(key = %key, tier = "memory", "cache hit");
                            return Some(v);
                        }
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "cached value has unexpected shape");
                        }
                    }
                } else {
                    expired = true;
                }
            }
            if expired {
                mem.remove(key.as_str());
                tracing::debug!(key = %key, "expired entry removed from memory tier");
            }
        }

        if let Some(v) = self.get_durable::<T>(key, now) {
            return Some(v);
        }

        self.memory.lock().misses += 1;
        tracing::debug!(key = %key, "cache miss");
        None
    }

    fn get_durable<T: DeserializeOwned>(&self, key: &CacheKey, now: u64) -> Option<T> {
        let tier = self.durable.as_ref()?;
        let mut entry = tier.read(key)?;
        if !entry.is_live_at(now) {
            tier.remove(key);
            tracing::debug!(key = %key, "expired entry removed from durable tier");
            return None;
        }

        let value = match serde_json::from_value::<T>(entry.data.clone()) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "durable value has unexpected shape");
                return None;
            }
        };

        entry.hit_count += 1;
        if entry.size_bytes.is_none() {
            entry.size_bytes = Some(json_size(&entry.data));
        }

        let mut mem = self.memory.lock();
        mem.insert(key.as_str(), entry);
        mem.hits += 1;
        if self.opts.auto_evict {
            mem.evict(self.opts.max_entries, self.opts.max_size_bytes);
        }
        tracing::debug!(key = %key, tier = "durable", "cache hit; promoted to memory");
        Some(value)
    }

    /// Insert `value` under `key` with `ttl` (or the configured default).
    ///
    /// The entry is written through to the durable tier when one is configured. Values that fail
    /// to serialize are skipped.
    pub fn set<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T, ttl: Option<Duration>) {
        let data = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "value not cacheable; skipping");
                return;
            }
        };
        let size = json_size(&data);
        let ttl = ttl.unwrap_or_else(|| self.opts.default_ttl());
        let entry = CacheEntry::new(data, now_ms(), ttl, Some(size));

        if let Some(tier) = &self.durable {
            tier.write(key, &entry);
        }

        let mut mem = self.memory.lock();
        mem.insert(key.as_str(), entry);
        if self.opts.auto_evict {
            mem.evict(self.opts.max_entries, self.opts.max_size_bytes);
        }
    }

    /// Remove `key` from both tiers. A missing durable file is fine.
    pub fn delete(&self, key: &CacheKey) {
        self.memory.lock().remove(key.as_str());
        if let Some(tier) = &self.durable {
            tier.remove(key);
        }
    }

    /// Whether a live entry exists, with `get`'s expiry semantics but without touching stats or
    /// promoting between tiers.
    pub fn has(&self, key: &CacheKey) -> bool {
        let now = now_ms();
        {
            let mut mem = self.memory.lock();
            let live = mem.slots.get(key.as_str()).map(|s| s.entry.is_live_at(now));
            match live {
                Some(true) => return true,
                Some(false) => {
                    mem.remove(key.as_str());
                }
                None => {}
            }
        }

        let Some(tier) = &self.durable else {
            return false;
        };
        match tier.read(key) {
            Some(entry) if entry.is_live_at(now) => true,
            Some(_) => {
                tier.remove(key);
                false
            }
            None => false,
        }
    }

    /// Empty both tiers and reset statistics.
    pub fn clear(&self) {
        *self.memory.lock() = MemoryTier::default();
        let removed = self.durable.as_ref().map(FileTier::clear).unwrap_or(0);
        tracing::info!(durable_removed = removed, "cache cleared");
    }

    /// Drop expired in-process entries now; returns how many were removed.
    ///
    /// Expiry is otherwise lazy; this exists for callers that want to reclaim memory explicitly.
    pub fn purge_expired(&self) -> usize {
        let now = now_ms();
        let mut mem = self.memory.lock();
        let expired: Vec<String> = mem
            .slots
            .iter()
            .filter(|(_, s)| !s.entry.is_live_at(now))
            .map(|(k, _)| k.clone())
            .collect();
        for k in &expired {
            mem.remove(k);
        }
        expired.len()
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// Errors from `f` are returned as-is and nothing is cached for them.
    pub fn get_or_try_insert_with<T, E, F>(
        &self,
        key: &CacheKey,
        ttl: Option<Duration>,
        f: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(v) = self.get::<T>(key) {
            return Ok(v);
        }
        let v = f()?;
        self.set(key, &v, ttl);
        Ok(v)
    }

    /// Snapshot of the aggregate counters.
    pub fn stats(&self) -> CacheStats {
        self.memory.lock().stats()
    }

    /// Envelope files in the durable tier, or `None` when the cache is memory-only.
    pub fn durable_entry_count(&self) -> Option<usize> {
        self.durable.as_ref().map(FileTier::count)
    }

    /// Hit count recorded on the in-memory entry for `key`, if present.
    pub fn hit_count(&self, key: &CacheKey) -> Option<u64> {
        self.memory
            .lock()
            .slots
            .get(key.as_str())
            .map(|s| s.entry.hit_count)
    }
}

fn json_size(v: &serde_json::Value) -> u64 {
    serde_json::to_vec(v)
        .map(|b| b.len() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "../../tests/unit/cache/store.rs"]
mod tests;
