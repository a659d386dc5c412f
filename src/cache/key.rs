use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Payload family a cache key belongs to.
///
/// Keys of different kinds never collide even when their identifiers are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    /// Generated caption text.
    Caption,
    /// Binary image payloads.
    Image,
    /// Segmented (background-removed) subject bytes.
    Mask,
    /// Sets of caption/creative variations.
    Variations,
    /// Finished [`crate::RenderResult`] values.
    Render,
    /// [`crate::StyleAnalysis`] profiles keyed by reference image.
    Style,
}

impl CacheKind {
    /// Stable prefix used in the canonical key string.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Caption => "caption",
            Self::Image => "image",
            Self::Mask => "mask",
            Self::Variations => "variations",
            Self::Render => "render",
            Self::Style => "style",
        }
    }
}

/// Typed cache key: a [`CacheKind`] plus an identifier.
///
/// The canonical string form is `"{kind}:{id}"`; durable-tier file names derive from its SHA-256.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: CacheKind,
    canonical: String,
}

impl CacheKey {
    /// Build a key for `id` within `kind`.
    pub fn new(kind: CacheKind, id: impl AsRef<str>) -> Self {
        Self {
            kind,
            canonical: format!("{}:{}", kind.prefix(), id.as_ref()),
        }
    }

    /// Payload kind.
    pub fn kind(&self) -> CacheKind {
        self.kind
    }

    /// Identifier part (without the kind prefix).
    pub fn id(&self) -> &str {
        &self.canonical[self.kind.prefix().len() + 1..]
    }

    /// Canonical `"{kind}:{id}"` string.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Lowercase hex SHA-256 of the canonical string.
    pub fn digest_hex(&self) -> String {
        format!("{:x}", Sha256::digest(self.canonical.as_bytes()))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/key.rs"]
mod tests;
