pub(crate) mod bytes;
pub(crate) mod entry;
pub(crate) mod file_tier;
pub(crate) mod key;
pub(crate) mod stats;
pub(crate) mod store;
