use std::ops::Deref;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Binary cache payload stored as a base64 string.
///
/// A bare `Vec<u8>` serializes to a JSON array of numbers, several times the raw size; this
/// keeps tracked sizes and durable files within a third of the raw byte count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CachedBytes(pub Vec<u8>);

impl CachedBytes {
    /// Unwrap the raw bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for CachedBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Deref for CachedBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for CachedBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for CachedBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Self)
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/bytes.rs"]
mod tests;
