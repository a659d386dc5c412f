pub(crate) mod analyzer;
pub(crate) mod composition;
pub(crate) mod descriptors;
pub(crate) mod enhance;
pub(crate) mod fallback;
pub(crate) mod palette;
pub(crate) mod profile;
pub(crate) mod tone;
