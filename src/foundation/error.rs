/// Convenience result type used across Adcraft.
pub type AdcraftResult<T> = Result<T, AdcraftError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// The render cache never surfaces these for its own storage problems; they are reserved for
/// construction-time misconfiguration and for analysis/render failures the caller must see.
#[derive(thiserror::Error, Debug)]
pub enum AdcraftError {
    /// Invalid configuration or request data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image bytes that cannot be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// An image reference that cannot be resolved to bytes.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Failures while composing or encoding a creative.
    #[error("render error: {0}")]
    Render(String),

    /// Failures while persisting render output.
    #[error("storage error: {0}")]
    Storage(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdcraftError {
    /// Build a [`AdcraftError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`AdcraftError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`AdcraftError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`AdcraftError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`AdcraftError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build a [`AdcraftError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
