use serde::Serialize;

/// Aggregate counters for a [`crate::RenderCache`]. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// `get` calls that returned a value.
    pub hits: u64,
    /// `get` calls that returned nothing.
    pub misses: u64,
    /// Entries currently held by the in-process tier.
    pub entry_count: usize,
    /// Sum of tracked entry sizes in the in-process tier.
    pub total_memory_bytes: u64,
}

impl CacheStats {
    /// `hits / (hits + misses)`, or 0 before any access.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}
