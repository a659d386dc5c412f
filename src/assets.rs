pub(crate) mod codec;
pub(crate) mod fetch;
