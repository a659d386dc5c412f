pub(crate) mod brand;
pub(crate) mod composite;
pub(crate) mod fingerprint;
pub(crate) mod layout;
pub(crate) mod model;
pub(crate) mod output;
pub(crate) mod overlay;
pub(crate) mod renderer;
pub(crate) mod segment;
