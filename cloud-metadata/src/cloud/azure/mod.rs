//! Azure instance metadata service
pub mod detector;
pub(crate) mod metadata;
