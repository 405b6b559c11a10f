//! Cloud instance metadata detectors
pub mod aws;
pub mod azure;
/// Detection across every supported provider
pub mod detector;
pub mod gcp;
/// HTTP transport used by cloud detectors
pub mod http_client;

#[cfg(test)]
pub(crate) mod fixtures;
