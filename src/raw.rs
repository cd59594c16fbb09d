pub(crate) mod codec;
pub(crate) mod formats;
pub(crate) mod types;
