pub(crate) mod color;
pub(crate) mod error;
pub(crate) mod math;
pub(crate) mod stats;
