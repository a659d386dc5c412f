use crate::foundation::error::AdcraftResult;

/// Model used when a workspace has no preference.
pub const DEFAULT_SEGMENTATION_MODEL: &str = "default";

/// External background-removal capability.
///
/// Takes encoded image bytes and a model identifier, returns encoded bytes of the masked subject.
/// Callers treat any error as "use the original image".
pub trait Segmenter: Send + Sync {
    /// Remove the background from `image` using `model`.
    fn segment(&self, image: &[u8], model: &str) -> AdcraftResult<Vec<u8>>;
}
