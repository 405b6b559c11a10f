//! AWS EC2 instance metadata service
pub mod detector;
pub mod http_client;
pub(crate) mod metadata;
