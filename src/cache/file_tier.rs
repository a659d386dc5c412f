use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cache::entry::CacheEntry;
use crate::cache::key::CacheKey;
use crate::foundation::error::{AdcraftError, AdcraftResult};

/// File-backed cache tier: one JSON envelope per key, named by the key's SHA-256.
///
/// Every operation after [`FileTier::open`] is best-effort. Read problems are misses, write
/// problems leave the entry in memory only.
#[derive(Debug)]
pub(crate) struct FileTier {
    dir: PathBuf,
}

impl FileTier {
    /// Open the tier, creating `dir` if needed. This is the only fallible step.
    pub(crate) fn open(dir: impl Into<PathBuf>) -> AdcraftResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create cache dir '{}'", dir.display()))
            .map_err(|e| AdcraftError::storage(format!("{e:#}")))?;
        Ok(Self { dir })
    }

    pub(crate) fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.digest_hex()))
    }

    pub(crate) fn read(&self, key: &CacheKey) -> Option<CacheEntry<serde_json::Value>> {
        let path = self.path_for(key);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(key = %key, path = %path.display(), error = %e, "durable cache read failed");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(key = %key, path = %path.display(), error = %e, "discarding corrupt durable cache entry");
                self.remove_path(&path);
                None
            }
        }
    }

    /// Write via a temp file + rename so readers never observe a torn envelope.
    pub(crate) fn write(&self, key: &CacheKey, entry: &CacheEntry<serde_json::Value>) -> bool {
        let path = self.path_for(key);
        let tmp = path.with_extension(format!("json.{}.tmp", std::process::id()));

        let result = serde_json::to_vec(entry)
            .context("serialize cache envelope")
            .and_then(|bytes| {
                std::fs::write(&tmp, bytes)
                    .with_context(|| format!("write '{}'", tmp.display()))
            })
            .and_then(|()| {
                std::fs::rename(&tmp, &path)
                    .with_context(|| format!("rename into '{}'", path.display()))
            });

        match result {
            Ok(()) => {
                tracing::debug!(key = %key, path = %path.display(), "durable cache write");
                true
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %format!("{e:#}"), "durable cache write failed; entry kept in memory only");
                let _ = std::fs::remove_file(&tmp);
                false
            }
        }
    }

    pub(crate) fn remove(&self, key: &CacheKey) {
        self.remove_path(&self.path_for(key));
    }

    /// Number of envelope files currently on disk, live or not.
    pub(crate) fn count(&self) -> usize {
        std::fs::read_dir(&self.dir)
            .map(|rd| rd.flatten().filter(|e| is_envelope(&e.path())).count())
            .unwrap_or(0)
    }

    /// Remove every envelope file; returns how many were deleted.
    pub(crate) fn clear(&self) -> usize {
        let Ok(rd) = std::fs::read_dir(&self.dir) else {
            tracing::warn!(dir = %self.dir.display(), "durable cache dir unreadable during clear");
            return 0;
        };

        let mut removed = 0;
        for entry in rd.flatten() {
            let path = entry.path();
            if is_envelope(&path) && std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    fn remove_path(&self, path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "durable cache remove failed");
            }
        }
    }
}

fn is_envelope(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
}

#[cfg(test)]
#[path = "../../tests/unit/cache/file_tier.rs"]
mod tests;
