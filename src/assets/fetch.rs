use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use parking_lot::RwLock;

use crate::foundation::error::{AdcraftError, AdcraftResult};

/// Resolves an opaque image reference to raw encoded bytes.
///
/// Implementations are the only place this subsystem performs reference I/O; analysis and
/// rendering operate on the returned bytes.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the encoded bytes behind `uri`.
    fn fetch(&self, uri: &str) -> AdcraftResult<Vec<u8>>;
}

/// Fetches images from files under a content root.
///
/// Accepts content-relative paths (`uploads/a.png`) and `file://` URIs carrying a relative path.
/// Any other scheme (for example `https://`) is reported as unreachable.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    /// Create a fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Content root this fetcher reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageFetcher for FsFetcher {
    fn fetch(&self, uri: &str) -> AdcraftResult<Vec<u8>> {
        let rel = match uri.split_once("://") {
            Some(("file", rest)) => rest,
            Some((scheme, _)) => {
                return Err(AdcraftError::fetch(format!(
                    "unsupported scheme '{scheme}' for '{uri}'"
                )));
            }
            None => uri,
        };
        let norm = normalize_rel_path(rel)?;
        let path = self.root.join(Path::new(&norm));
        std::fs::read(&path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))
            .map_err(|e| AdcraftError::fetch(format!("{e:#}")))
    }
}

/// In-process fetcher backed by a map; used for pre-fetched uploads and tests.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    images: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under `uri`, replacing any previous bytes.
    pub fn insert(&self, uri: impl Into<String>, bytes: Vec<u8>) {
        self.images.write().insert(uri.into(), bytes);
    }
}

impl ImageFetcher for MemoryFetcher {
    fn fetch(&self, uri: &str) -> AdcraftResult<Vec<u8>> {
        self.images
            .read()
            .get(uri)
            .cloned()
            .ok_or_else(|| AdcraftError::fetch(format!("no image registered for '{uri}'")))
    }
}

/// Normalize and validate content-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> AdcraftResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(AdcraftError::fetch("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(AdcraftError::fetch("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(AdcraftError::fetch("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(AdcraftError::fetch("image path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
