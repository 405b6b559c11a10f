//! Detects the cloud provider hosting the current process by querying the
//! instance metadata servers of AWS, GCP and Azure.
//!
//! Every probe is bounded by two budgets: a connect budget for the response
//! head and a total budget for the whole exchange. Whatever the provider, the
//! result is normalized into a [CanonicalMetadata].
//!
//! The crate only emits `tracing` events, installing a subscriber is up to the
//! host process.
pub mod cloud;
pub mod config;
pub mod metadata;
pub mod normalizer;
pub mod probe;

pub use cloud::aws::detector::AWSDetector;
pub use cloud::azure::detector::AzureDetector;
pub use cloud::detector::CloudDetector;
pub use cloud::gcp::detector::GCPDetector;
pub use cloud::http_client::{HttpTransport, ReqwestTransport, ResponseStream, TransportError};
pub use config::{DetectionConfig, MissingFieldPolicy, ProbeConfig, Protocol};
pub use metadata::{CanonicalMetadata, Provider, UnknownProviderError};
pub use normalizer::{is_provider_document, normalize, normalize_with};
pub use probe::{ErrorKind, Probe, ProbeError, ProbeOutcome};
