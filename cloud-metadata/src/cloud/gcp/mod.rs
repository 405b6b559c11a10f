//! GCP compute metadata server
pub mod detector;
pub(crate) mod metadata;
